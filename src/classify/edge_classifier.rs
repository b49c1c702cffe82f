use crate::error::{Result, TopologyError};
use crate::model::{
    BlockId, Condition, ConditionCatalog, DomainId, EdgeKind, EdgeStreamData, ElementType,
    MatZone, MeshModel,
};

use super::vertex_record::Evidence;

/// Classification of one streamed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeClass {
    /// Material and zone pushed to both endpoints.
    pub ids: MatZone,
    pub evidence: Evidence,
    /// The edge belongs to the geometry (boundary / interface) output.
    pub geometry: bool,
    /// `false` when an interior edge has no resolvable neighbor block.
    pub context_resolved: bool,
}

impl EdgeClass {
    fn unresolved() -> Self {
        Self {
            ids: MatZone::UNDEFINED,
            evidence: Evidence::Volume,
            geometry: false,
            context_resolved: false,
        }
    }
}

/// Decides the material, zone, evidence source and geometry membership of
/// each edge from its owner block, owner domain and neighbor block.
///
/// Runs of edges sharing an owner hit a one-entry cache instead of the model.
pub struct EdgeClassifier<'a, M: MeshModel + ?Sized> {
    model: &'a M,
    catalog: &'a ConditionCatalog,
    block_cache: Option<(BlockId, Option<Condition>)>,
    domain_cache: Option<(DomainId, Option<Condition>)>,
}

impl<'a, M: MeshModel + ?Sized> EdgeClassifier<'a, M> {
    /// Creates a new classifier over `model`.
    #[must_use]
    pub fn new(model: &'a M, catalog: &'a ConditionCatalog) -> Self {
        Self {
            model,
            catalog,
            block_cache: None,
            domain_cache: None,
        }
    }

    /// Classifies one edge.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidTopology`] if the streamed element is
    /// not a 2-vertex bar.
    pub fn classify(&mut self, edge: &EdgeStreamData) -> Result<EdgeClass> {
        if edge.element.kind != ElementType::Bar || edge.element.vertices.len() != 2 {
            return Err(TopologyError::InvalidTopology(format!(
                "expected a 2-vertex bar, got {:?} with {} vertices",
                edge.element.kind,
                edge.element.vertices.len()
            ))
            .into());
        }
        Ok(match edge.kind {
            EdgeKind::Boundary => self.classify_boundary(edge),
            EdgeKind::Interior => self.classify_interior(edge),
            EdgeKind::Connection => self.classify_connection(edge),
        })
    }

    /// Prefers the domain condition; falls back to the block when the domain
    /// is missing or leaves material or zone undefined. Always geometry.
    fn classify_boundary(&mut self, edge: &EdgeStreamData) -> EdgeClass {
        let from_domain = edge
            .owner
            .domain
            .and_then(|d| self.domain_ids(d))
            .filter(MatZone::is_complete);
        let (ids, evidence) = match from_domain {
            Some(ids) => (ids, Evidence::Boundary),
            None => (self.block_ids(edge.owner.block), Evidence::Volume),
        };
        EdgeClass {
            ids,
            evidence,
            geometry: true,
            context_resolved: true,
        }
    }

    fn classify_interior(&mut self, edge: &EdgeStreamData) -> EdgeClass {
        let owner = edge.owner.block;
        let Some(neighbor) = edge.neighbor_cell.and_then(|c| self.model.cell_block(c)) else {
            return EdgeClass::unresolved();
        };

        let mut ids = self.block_ids(owner);
        let mut geometry = false;
        if neighbor != owner {
            let other = self.block_ids(neighbor);
            geometry = other != ids;
            if geometry {
                if other.material == ids.material {
                    ids.zone = ids.zone.max(other.zone);
                } else if other.material > ids.material {
                    ids = other;
                }
            }
        }
        EdgeClass {
            ids,
            evidence: Evidence::Volume,
            geometry,
            context_resolved: true,
        }
    }

    /// An interior edge whose domain condition, when present, overrides the
    /// volume result.
    fn classify_connection(&mut self, edge: &EdgeStreamData) -> EdgeClass {
        let mut class = self.classify_interior(edge);
        if let Some(ids) = edge.owner.domain.and_then(|d| self.domain_ids(d)) {
            class.geometry = class.geometry || ids != class.ids;
            class.ids = ids;
            class.evidence = Evidence::Boundary;
        }
        class
    }

    fn block_ids(&mut self, block: BlockId) -> MatZone {
        let condition = match self.block_cache {
            Some((id, condition)) if id == block => condition,
            _ => {
                let condition = self.model.block_condition(block);
                self.block_cache = Some((block, condition));
                condition
            }
        };
        condition.map_or(MatZone::UNDEFINED, |c| self.catalog.resolve(&c))
    }

    /// `None` when the domain has no condition.
    fn domain_ids(&mut self, domain: DomainId) -> Option<MatZone> {
        let condition = match self.domain_cache {
            Some((id, condition)) if id == domain => condition,
            _ => {
                let condition = self.model.domain_condition(domain);
                self.domain_cache = Some((domain, condition));
                condition
            }
        };
        condition.map(|c| self.catalog.resolve(&c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::model::{BlockData, DomainData, EdgeOwner, ElementData, GridModel, MaterialId, ZoneId};

    struct Fixture {
        model: GridModel,
        catalog: ConditionCatalog,
        blocks: Vec<BlockId>,
    }

    /// One triangle per block condition, all sharing vertex 0.
    fn fixture(conditions: &[Option<(u32, i32)>]) -> Fixture {
        let mut model = GridModel::new();
        let mut blocks = Vec::new();
        let hub = model.add_vertex(Point2::new(0.0, 0.0)).unwrap();
        for (i, condition) in conditions.iter().enumerate() {
            let block = model.add_block(BlockData::new(
                format!("b{i}"),
                condition.map(|(t, id)| Condition::new(t, id)),
            ));
            #[allow(clippy::cast_precision_loss)]
            let x = i as f64;
            let v1 = model.add_vertex(Point2::new(x, 1.0)).unwrap();
            let v2 = model.add_vertex(Point2::new(x + 1.0, 1.0)).unwrap();
            model.add_face(block, &[hub, v1, v2]).unwrap();
            blocks.push(block);
        }
        Fixture {
            model,
            catalog: ConditionCatalog::new(),
            blocks,
        }
    }

    fn edge(
        kind: EdgeKind,
        block: BlockId,
        domain: Option<DomainId>,
        neighbor_cell: Option<usize>,
    ) -> EdgeStreamData {
        EdgeStreamData {
            element: ElementData::new(ElementType::Bar, vec![0, 1], block),
            kind,
            owner: EdgeOwner { block, domain },
            neighbor_cell,
        }
    }

    #[test]
    fn boundary_prefers_domain() {
        let mut f = fixture(&[Some((2, 1))]);
        let d = f
            .model
            .add_domain(DomainData::new("wall", Some(Condition::new(3, 5))));
        let mut classifier = EdgeClassifier::new(&f.model, &f.catalog);
        let class = classifier
            .classify(&edge(EdgeKind::Boundary, f.blocks[0], Some(d), None))
            .unwrap();
        assert_eq!(class.ids, MatZone::new(2, 5));
        assert_eq!(class.evidence, Evidence::Boundary);
        assert!(class.geometry);
    }

    #[test]
    fn boundary_falls_back_to_block() {
        let mut f = fixture(&[Some((2, 1))]);
        let unspecified = f.model.add_domain(DomainData::new("open", None));
        let half = f
            .model
            .add_domain(DomainData::new("half", Some(Condition::UNSPECIFIED)));
        let mut classifier = EdgeClassifier::new(&f.model, &f.catalog);
        for domain in [None, Some(unspecified), Some(half)] {
            let class = classifier
                .classify(&edge(EdgeKind::Boundary, f.blocks[0], domain, None))
                .unwrap();
            assert_eq!(class.ids, MatZone::new(1, 1));
            assert_eq!(class.evidence, Evidence::Volume);
            assert!(class.geometry);
        }
    }

    #[test]
    fn interior_same_block_is_not_geometry() {
        let f = fixture(&[Some((4, 2))]);
        let mut classifier = EdgeClassifier::new(&f.model, &f.catalog);
        let class = classifier
            .classify(&edge(EdgeKind::Interior, f.blocks[0], None, Some(0)))
            .unwrap();
        assert_eq!(class.ids, MatZone::new(3, 2));
        assert_eq!(class.evidence, Evidence::Volume);
        assert!(!class.geometry);
        assert!(class.context_resolved);
    }

    #[test]
    fn interior_higher_material_wins() {
        // block A: material 1 zone 1, block B: material 3 zone 1
        let f = fixture(&[Some((2, 1)), Some((4, 1))]);
        let mut classifier = EdgeClassifier::new(&f.model, &f.catalog);
        let from_a = classifier
            .classify(&edge(EdgeKind::Interior, f.blocks[0], None, Some(1)))
            .unwrap();
        let from_b = classifier
            .classify(&edge(EdgeKind::Interior, f.blocks[1], None, Some(0)))
            .unwrap();
        for class in [from_a, from_b] {
            assert!(class.geometry);
            assert_eq!(class.ids, MatZone::new(3, 1));
            assert_eq!(class.evidence, Evidence::Volume);
        }
    }

    #[test]
    fn interior_same_material_takes_max_zone() {
        let f = fixture(&[Some((2, 4)), Some((2, 9))]);
        let mut classifier = EdgeClassifier::new(&f.model, &f.catalog);
        let class = classifier
            .classify(&edge(EdgeKind::Interior, f.blocks[1], None, Some(0)))
            .unwrap();
        assert!(class.geometry);
        assert_eq!(class.ids.material, MaterialId(1));
        assert_eq!(class.ids.zone, ZoneId(9));
    }

    #[test]
    fn interior_identical_conditions_across_blocks() {
        let f = fixture(&[Some((5, 2)), Some((5, 2))]);
        let mut classifier = EdgeClassifier::new(&f.model, &f.catalog);
        let class = classifier
            .classify(&edge(EdgeKind::Interior, f.blocks[0], None, Some(1)))
            .unwrap();
        assert!(!class.geometry);
        assert_eq!(class.ids, MatZone::new(4, 2));
    }

    #[test]
    fn interior_without_neighbor_is_unresolved() {
        let f = fixture(&[Some((2, 1))]);
        let mut classifier = EdgeClassifier::new(&f.model, &f.catalog);
        for cell in [None, Some(42)] {
            let class = classifier
                .classify(&edge(EdgeKind::Interior, f.blocks[0], None, cell))
                .unwrap();
            assert_eq!(class, EdgeClass::unresolved());
        }
    }

    #[test]
    fn connection_without_domain_matches_interior() {
        let f = fixture(&[Some((2, 1)), Some((4, 7))]);
        let mut classifier = EdgeClassifier::new(&f.model, &f.catalog);
        let interior = classifier
            .classify(&edge(EdgeKind::Interior, f.blocks[0], None, Some(1)))
            .unwrap();
        let connection = classifier
            .classify(&edge(EdgeKind::Connection, f.blocks[0], None, Some(1)))
            .unwrap();
        assert_eq!(interior, connection);
    }

    #[test]
    fn connection_domain_overrides_volume() {
        let mut f = fixture(&[Some((2, 1))]);
        let baffle = f
            .model
            .add_domain(DomainData::new("baffle", Some(Condition::new(6, 3))));
        let mut classifier = EdgeClassifier::new(&f.model, &f.catalog);
        let class = classifier
            .classify(&edge(EdgeKind::Connection, f.blocks[0], Some(baffle), Some(0)))
            .unwrap();
        assert_eq!(class.ids, MatZone::new(5, 3));
        assert_eq!(class.evidence, Evidence::Boundary);
        assert!(class.geometry);
    }

    #[test]
    fn connection_domain_matching_volume_is_not_geometry() {
        let mut f = fixture(&[Some((2, 1))]);
        let same = f
            .model
            .add_domain(DomainData::new("same", Some(Condition::new(2, 1))));
        let mut classifier = EdgeClassifier::new(&f.model, &f.catalog);
        let class = classifier
            .classify(&edge(EdgeKind::Connection, f.blocks[0], Some(same), Some(0)))
            .unwrap();
        assert!(!class.geometry);
        assert_eq!(class.evidence, Evidence::Boundary);
    }

    #[test]
    fn non_bar_element_is_invalid() {
        let f = fixture(&[Some((2, 1))]);
        let mut classifier = EdgeClassifier::new(&f.model, &f.catalog);
        let mut tri = edge(EdgeKind::Boundary, f.blocks[0], None, None);
        tri.element = ElementData::new(ElementType::Tri, vec![0, 1, 2], f.blocks[0]);
        assert!(matches!(
            classifier.classify(&tri),
            Err(crate::NlistError::Topology(TopologyError::InvalidTopology(_)))
        ));
    }

    #[test]
    fn cache_follows_owner_changes() {
        let f = fixture(&[Some((2, 1)), Some((8, 4))]);
        let mut classifier = EdgeClassifier::new(&f.model, &f.catalog);
        let mut seen = Vec::new();
        for &b in &[f.blocks[0], f.blocks[0], f.blocks[1], f.blocks[0]] {
            let class = classifier
                .classify(&edge(EdgeKind::Boundary, b, None, None))
                .unwrap();
            seen.push(class.ids);
        }
        assert_eq!(
            seen,
            vec![
                MatZone::new(1, 1),
                MatZone::new(1, 1),
                MatZone::new(7, 4),
                MatZone::new(1, 1)
            ]
        );
    }
}
