use crate::model::{IdValue, MatZone, MaterialId, VertexIndex, ZoneId};

use super::managed_id::ManagedId;

/// Where a material/zone observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Evidence {
    /// A block (volume) condition.
    Volume,
    /// A domain (boundary) condition. Takes precedence over volume evidence.
    Boundary,
}

/// A resolved id with its conflict flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<T> {
    pub id: T,
    pub had_conflict: bool,
}

/// Aggregated classification of one vertex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexRecord {
    is_boundary: bool,
    neighbors: Vec<VertexIndex>,
    volume_material: ManagedId<MaterialId>,
    volume_zone: ManagedId<ZoneId>,
    boundary_material: ManagedId<MaterialId>,
    boundary_zone: ManagedId<ZoneId>,
}

impl VertexRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one incident edge into the record.
    ///
    /// `neighbor` is the other endpoint of the edge. Neighbors keep edge
    /// stream order and are not deduplicated.
    pub fn push(
        &mut self,
        neighbor: VertexIndex,
        ids: MatZone,
        evidence: Evidence,
        is_boundary: bool,
    ) {
        self.neighbors.push(neighbor);
        if is_boundary {
            self.is_boundary = true;
        }
        match evidence {
            Evidence::Volume => {
                self.volume_material.offer(ids.material);
                self.volume_zone.offer(ids.zone);
            }
            Evidence::Boundary => {
                self.boundary_material.offer(ids.material);
                self.boundary_zone.offer(ids.zone);
            }
        }
    }

    #[must_use]
    pub fn neighbors(&self) -> &[VertexIndex] {
        &self.neighbors
    }

    #[must_use]
    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    #[must_use]
    pub fn is_boundary(&self) -> bool {
        self.is_boundary
    }

    /// The final material: boundary evidence if any, else volume evidence,
    /// else undefined flagged as a conflict.
    #[must_use]
    pub fn material(&self) -> Resolved<MaterialId> {
        evaluate(&self.volume_material, &self.boundary_material)
    }

    /// The final zone, resolved like [`VertexRecord::material`].
    #[must_use]
    pub fn zone(&self) -> Resolved<ZoneId> {
        evaluate(&self.volume_zone, &self.boundary_zone)
    }
}

fn evaluate<T: IdValue>(volume: &ManagedId<T>, boundary: &ManagedId<T>) -> Resolved<T> {
    let (id, had_conflict) = boundary
        .resolve()
        .or_else(|| volume.resolve())
        .unwrap_or((T::UNDEFINED, true));
    Resolved { id, had_conflict }
}
