use super::{BlockId, VertexIndex};

/// Kind of a mesh element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// A 2-vertex segment, the 2D "edge" primitive.
    Bar,
    /// A triangle.
    Tri,
    /// A quadrilateral.
    Quad,
}

/// A mesh element: its kind, its vertex indices and its owning block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub kind: ElementType,
    pub vertices: Vec<VertexIndex>,
    pub block: BlockId,
}

impl ElementData {
    /// Creates a new element.
    #[must_use]
    pub fn new(kind: ElementType, vertices: Vec<VertexIndex>, block: BlockId) -> Self {
        Self {
            kind,
            vertices,
            block,
        }
    }

    /// The closed loop of directed edges around a face, in local order.
    ///
    /// Returns an empty iterator for elements that are not faces.
    pub fn face_edges(&self) -> impl Iterator<Item = (VertexIndex, VertexIndex)> + '_ {
        let n = match self.kind {
            ElementType::Tri | ElementType::Quad => self.vertices.len(),
            ElementType::Bar => 0,
        };
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}
