//! Edge streaming protocol between a mesh model and its consumers.
//!
//! A [`MeshModel`](super::MeshModel) drives the stream: it calls
//! [`EdgeStreamHandler::stream_begin`] once, [`EdgeStreamHandler::stream_edge`]
//! for every edge in an order of its choosing, then
//! [`EdgeStreamHandler::stream_end`]. An error from the handler stops the
//! stream; `stream_end` is still delivered with `completed = false`.

use crate::error::Result;

use super::element::ElementData;
use super::{BlockId, DomainId};

/// Topological category of a streamed edge, assigned by the mesh model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Used by exactly one face.
    Boundary,
    /// Between two faces of the same block.
    Interior,
    /// Between two faces of different blocks, or an interior edge that is
    /// also a member of a (non-inflated) boundary domain.
    Connection,
}

/// The entities owning a streamed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeOwner {
    pub block: BlockId,
    pub domain: Option<DomainId>,
}

/// Summary sent before the first edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamBegin {
    pub edge_count: usize,
    pub boundary_edge_count: usize,
}

/// One streamed edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeStreamData {
    /// The element; a 2D edge is a [`Bar`](super::ElementType::Bar).
    pub element: ElementData,
    pub kind: EdgeKind,
    pub owner: EdgeOwner,
    /// Index of the face on the other side of the edge, if any.
    pub neighbor_cell: Option<usize>,
}

/// Sent after the last edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamEnd {
    pub completed: bool,
}

/// Receives the edges of a mesh model one at a time.
pub trait EdgeStreamHandler {
    /// Called once before any edge.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the stream.
    fn stream_begin(&mut self, data: &StreamBegin) -> Result<()>;

    /// Called once per edge.
    ///
    /// # Errors
    ///
    /// Returning an error aborts the stream.
    fn stream_edge(&mut self, data: &EdgeStreamData) -> Result<()>;

    /// Called once after the last edge, or after an aborted edge.
    ///
    /// # Errors
    ///
    /// Returning an error fails the stream.
    fn stream_end(&mut self, data: &StreamEnd) -> Result<()>;
}
