pub mod block;
pub mod catalog;
pub mod condition;
pub mod description;
pub mod domain;
pub mod element;
pub mod stream;

pub use block::{BlockData, BlockId};
pub use catalog::{material_letter, ConditionCatalog, ConditionType, MATERIAL_COUNT};
pub use condition::{Condition, IdValue, MatZone, MaterialId, ZoneId};
pub use description::MeshDescription;
pub use domain::{DomainData, DomainId, EdgeKey};
pub use element::{ElementData, ElementType};
pub use stream::{EdgeKind, EdgeOwner, EdgeStreamData, EdgeStreamHandler, StreamBegin, StreamEnd};

use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;
use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::math::Point2;

/// Index of a vertex in the mesh's vertex array.
pub type VertexIndex = u32;

/// Read-only view of a 2D unstructured mesh, as seen by the exporter.
pub trait MeshModel {
    /// Number of vertices; vertex indices run from `0` to `vertex_count() - 1`.
    fn vertex_count(&self) -> usize;

    /// Coordinates of a vertex.
    fn vertex(&self, index: VertexIndex) -> Option<Point2>;

    /// Number of face elements.
    fn element_count(&self) -> usize;

    /// A face element by index.
    fn element(&self, index: usize) -> Option<&ElementData>;

    /// The volume condition of a block.
    fn block_condition(&self, block: BlockId) -> Option<Condition>;

    /// The boundary condition of a domain.
    fn domain_condition(&self, domain: DomainId) -> Option<Condition>;

    /// The block owning a face element.
    fn cell_block(&self, cell: usize) -> Option<BlockId> {
        self.element(cell).map(|e| e.block)
    }

    /// Streams every edge of the mesh into `handler`.
    ///
    /// # Errors
    ///
    /// Returns an error if the edges cannot be derived or the handler fails.
    fn stream_edges(&self, handler: &mut dyn EdgeStreamHandler) -> Result<()>;
}

/// In-memory 2D mesh: vertices, tri/quad faces, blocks and domains.
///
/// Blocks and domains live in arenas keyed by generational ids.
#[derive(Debug, Default)]
pub struct GridModel {
    vertices: Vec<Point2>,
    blocks: SlotMap<BlockId, BlockData>,
    domains: SlotMap<DomainId, DomainData>,
    elements: Vec<ElementData>,
}

impl GridModel {
    /// Creates a new, empty grid model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a vertex and returns its index.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex index would not fit a [`VertexIndex`].
    pub fn add_vertex(&mut self, point: Point2) -> Result<VertexIndex> {
        let index = VertexIndex::try_from(self.vertices.len()).map_err(|_| {
            TopologyError::InvalidTopology("vertex count exceeds the index range".into())
        })?;
        self.vertices.push(point);
        Ok(index)
    }

    /// Inserts a block and returns its ID.
    pub fn add_block(&mut self, data: BlockData) -> BlockId {
        self.blocks.insert(data)
    }

    /// Returns a reference to the block data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the block is not in the model.
    pub fn block(&self, id: BlockId) -> Result<&BlockData> {
        self.blocks
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("block {id:?}")).into())
    }

    /// Inserts a domain and returns its ID.
    pub fn add_domain(&mut self, data: DomainData) -> DomainId {
        self.domains.insert(data)
    }

    /// Adds a triangle or quadrilateral owned by `block` and returns its cell index.
    ///
    /// # Errors
    ///
    /// Returns an error if the block does not exist, the vertex count does
    /// not match a tri or quad, or a vertex index is out of range.
    pub fn add_face(&mut self, block: BlockId, vertices: &[VertexIndex]) -> Result<usize> {
        self.block(block)?;
        let kind = match vertices.len() {
            3 => ElementType::Tri,
            4 => ElementType::Quad,
            n => {
                return Err(TopologyError::InvalidTopology(format!(
                    "a face needs 3 or 4 vertices, got {n}"
                ))
                .into())
            }
        };
        if let Some(&bad) = vertices
            .iter()
            .find(|&&v| usize::try_from(v).map_or(true, |v| v >= self.vertices.len()))
        {
            return Err(TopologyError::InvalidTopology(format!(
                "face vertex {bad} is out of range (vertex count {})",
                self.vertices.len()
            ))
            .into());
        }
        self.elements
            .push(ElementData::new(kind, vertices.to_vec(), block));
        Ok(self.elements.len() - 1)
    }

    /// All face elements, in cell order.
    #[must_use]
    pub fn elements(&self) -> &[ElementData] {
        &self.elements
    }

    /// Derives the edge stream from the faces.
    ///
    /// Every distinct undirected face edge appears once, in face order then
    /// local edge order, oriented as in the first face using it.
    ///
    /// # Errors
    ///
    /// Returns an error if an edge is shared by more than two faces.
    pub fn edges(&self) -> Result<Vec<EdgeStreamData>> {
        let mut edge_to_face: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
        for (cell, element) in self.elements.iter().enumerate() {
            for (a, b) in element.face_edges() {
                edge_to_face.entry(EdgeKey::new(a, b)).or_default().push(cell);
            }
        }

        let mut membership: HashMap<EdgeKey, DomainId> = HashMap::new();
        for (id, domain) in &self.domains {
            for key in domain.edges() {
                membership.entry(key).or_insert(id);
            }
        }

        let mut emitted: HashSet<EdgeKey> = HashSet::with_capacity(edge_to_face.len());
        let mut edges = Vec::with_capacity(edge_to_face.len());
        for (cell, element) in self.elements.iter().enumerate() {
            for (a, b) in element.face_edges() {
                let key = EdgeKey::new(a, b);
                if !emitted.insert(key) {
                    continue;
                }
                let faces = edge_to_face.get(&key).map_or(&[][..], Vec::as_slice);
                let domain = membership.get(&key).copied();
                let (kind, neighbor_cell) = match *faces {
                    [_] => (EdgeKind::Boundary, None),
                    [f0, f1] => {
                        let other = if f0 == cell { f1 } else { f0 };
                        let crosses = self.elements[other].block != element.block;
                        let kind = if crosses || domain.is_some() {
                            EdgeKind::Connection
                        } else {
                            EdgeKind::Interior
                        };
                        (kind, Some(other))
                    }
                    _ => {
                        return Err(TopologyError::NonManifoldEdge {
                            v0: a,
                            v1: b,
                            faces: faces.len(),
                        }
                        .into())
                    }
                };
                edges.push(EdgeStreamData {
                    element: ElementData::new(ElementType::Bar, vec![a, b], element.block),
                    kind,
                    owner: EdgeOwner {
                        block: element.block,
                        domain,
                    },
                    neighbor_cell,
                });
            }
        }
        Ok(edges)
    }
}

impl MeshModel for GridModel {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn vertex(&self, index: VertexIndex) -> Option<Point2> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.vertices.get(i))
            .copied()
    }

    fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn element(&self, index: usize) -> Option<&ElementData> {
        self.elements.get(index)
    }

    fn block_condition(&self, block: BlockId) -> Option<Condition> {
        self.blocks.get(block).and_then(|b| b.condition)
    }

    fn domain_condition(&self, domain: DomainId) -> Option<Condition> {
        self.domains.get(domain).and_then(|d| d.condition)
    }

    fn stream_edges(&self, handler: &mut dyn EdgeStreamHandler) -> Result<()> {
        let edges = self.edges()?;
        let begin = StreamBegin {
            edge_count: edges.len(),
            boundary_edge_count: edges
                .iter()
                .filter(|e| e.kind == EdgeKind::Boundary)
                .count(),
        };
        debug!(
            edges = begin.edge_count,
            boundary = begin.boundary_edge_count,
            "streaming grid edges"
        );
        let streamed = handler
            .stream_begin(&begin)
            .and_then(|()| edges.iter().try_for_each(|edge| handler.stream_edge(edge)));
        match streamed {
            Ok(()) => handler.stream_end(&StreamEnd { completed: true }),
            Err(err) => {
                // The stream failure is reported, not a failure of stream_end.
                if let Err(end_err) = handler.stream_end(&StreamEnd { completed: false }) {
                    debug!(%end_err, "stream_end failed after an aborted stream");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles sharing the diagonal (0, 2) of the unit square.
    fn split_square(same_block: bool) -> (GridModel, BlockId, BlockId) {
        let mut model = GridModel::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            model.add_vertex(Point2::new(x, y)).unwrap();
        }
        let a = model.add_block(BlockData::new("a", Some(Condition::new(2, 1))));
        let b = if same_block {
            a
        } else {
            model.add_block(BlockData::new("b", Some(Condition::new(4, 1))))
        };
        model.add_face(a, &[0, 1, 2]).unwrap();
        model.add_face(b, &[0, 2, 3]).unwrap();
        (model, a, b)
    }

    #[test]
    fn boundary_and_interior_edges() {
        let (model, a, _) = split_square(true);
        let edges = model.edges().unwrap();
        assert_eq!(edges.len(), 5);

        let diagonal = edges
            .iter()
            .find(|e| e.element.vertices == vec![2, 0])
            .unwrap();
        assert_eq!(diagonal.kind, EdgeKind::Interior);
        assert_eq!(diagonal.neighbor_cell, Some(1));
        assert_eq!(diagonal.owner.block, a);

        let boundary = edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Boundary)
            .count();
        assert_eq!(boundary, 4);
        assert!(edges.iter().all(|e| e.element.kind == ElementType::Bar));
    }

    #[test]
    fn edge_between_blocks_is_connection() {
        let (model, _, _) = split_square(false);
        let edges = model.edges().unwrap();
        let diagonal = edges
            .iter()
            .find(|e| e.neighbor_cell.is_some())
            .unwrap();
        assert_eq!(diagonal.kind, EdgeKind::Connection);
    }

    #[test]
    fn domain_member_interior_edge_is_connection() {
        let (mut model, _, _) = split_square(true);
        let mut domain = DomainData::new("baffle", Some(Condition::new(6, 2)));
        domain.add_edge(0, 2);
        let d = model.add_domain(domain);

        let edges = model.edges().unwrap();
        let diagonal = edges
            .iter()
            .find(|e| e.neighbor_cell.is_some())
            .unwrap();
        assert_eq!(diagonal.kind, EdgeKind::Connection);
        assert_eq!(diagonal.owner.domain, Some(d));
    }

    #[test]
    fn non_manifold_edge_rejected() {
        let (mut model, a, _) = split_square(true);
        let v = model.add_vertex(Point2::new(2.0, 2.0)).unwrap();
        model.add_face(a, &[0, 2, v]).unwrap();
        let err = model.edges().unwrap_err();
        assert!(matches!(
            err,
            crate::NlistError::Topology(TopologyError::NonManifoldEdge { faces: 3, .. })
        ));
    }

    #[test]
    fn bad_faces_rejected() {
        let (mut model, a, _) = split_square(true);
        assert!(model.add_face(a, &[0, 1]).is_err());
        assert!(model.add_face(a, &[0, 1, 9]).is_err());
        assert!(matches!(
            model.add_face(BlockId::default(), &[0, 1, 2]),
            Err(crate::NlistError::Topology(TopologyError::EntityNotFound(_)))
        ));
        assert!(model.block(a).is_ok());
    }

    /// Records the calls it receives and fails at a chosen point.
    #[derive(Default)]
    struct Recorder {
        fail_begin: bool,
        fail_edge: bool,
        fail_end: bool,
        edges: usize,
        ends: Vec<bool>,
    }

    impl EdgeStreamHandler for Recorder {
        fn stream_begin(&mut self, _begin: &StreamBegin) -> Result<()> {
            if self.fail_begin {
                return Err(TopologyError::InvalidTopology("begin".into()).into());
            }
            Ok(())
        }

        fn stream_edge(&mut self, _edge: &EdgeStreamData) -> Result<()> {
            self.edges += 1;
            if self.fail_edge {
                return Err(TopologyError::InvalidTopology("edge".into()).into());
            }
            Ok(())
        }

        fn stream_end(&mut self, end: &StreamEnd) -> Result<()> {
            self.ends.push(end.completed);
            if self.fail_end {
                return Err(TopologyError::InvalidTopology("end".into()).into());
            }
            Ok(())
        }
    }

    #[test]
    fn stream_delivers_every_edge() {
        let (model, _, _) = split_square(true);
        let mut recorder = Recorder::default();
        model.stream_edges(&mut recorder).unwrap();
        assert_eq!(recorder.edges, 5);
        assert_eq!(recorder.ends, vec![true]);
    }

    #[test]
    fn stream_end_follows_a_failed_begin() {
        let (model, _, _) = split_square(true);
        let mut recorder = Recorder {
            fail_begin: true,
            ..Recorder::default()
        };
        let err = model.stream_edges(&mut recorder).unwrap_err();
        assert_eq!(err.to_string(), "invalid topology: begin");
        assert_eq!(recorder.edges, 0);
        assert_eq!(recorder.ends, vec![false]);
    }

    #[test]
    fn edge_failure_survives_a_failing_stream_end() {
        let (model, _, _) = split_square(true);
        let mut recorder = Recorder {
            fail_edge: true,
            fail_end: true,
            ..Recorder::default()
        };
        let err = model.stream_edges(&mut recorder).unwrap_err();
        assert_eq!(err.to_string(), "invalid topology: edge");
        assert_eq!(recorder.edges, 1);
        assert_eq!(recorder.ends, vec![false]);
    }

    #[test]
    fn vertex_lookup() {
        let (model, _, _) = split_square(true);
        assert_eq!(model.vertex_count(), 4);
        assert_eq!(model.vertex(2), Some(Point2::new(1.0, 1.0)));
        assert_eq!(model.vertex(4), None);
        assert_eq!(model.cell_block(5), None);
    }
}
