use thiserror::Error;

use crate::export::ExportStage;
use crate::model::VertexIndex;

/// Top-level error type for the nlist exporter.
#[derive(Debug, Error)]
pub enum NlistError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Description(#[from] DescriptionError),

    /// A write to the output sink (or the companion log) failed.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading or streaming the mesh model.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("edge ({v0}, {v1}) is shared by {faces} faces")]
    NonManifoldEdge {
        v0: VertexIndex,
        v1: VertexIndex,
        faces: usize,
    },
}

/// Errors raised by the export passes.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A vertex cannot be written because its aggregate is incomplete.
    #[error("vertex {vertex} is unresolved: {reason}")]
    UnresolvedVertex {
        vertex: VertexIndex,
        reason: &'static str,
    },

    /// A vertex has coordinates but was never reached by the edge stream.
    #[error("could not find neighbor points for vertex {0}")]
    MissingVertexInfo(VertexIndex),

    #[error("unexpected element type in the {0} pass")]
    UnexpectedElement(&'static str),

    /// The cooperative cancellation signal was observed.
    #[error("export cancelled by user during the {0} pass")]
    Cancelled(&'static str),

    #[error("export step requires stage {expected:?}, session is at {actual:?}")]
    OutOfOrder {
        expected: ExportStage,
        actual: ExportStage,
    },
}

/// Errors raised while loading a mesh description.
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("malformed mesh description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown physical type: {0}")]
    UnknownPhysicalType(String),

    #[error("{what} index {index} is out of range (count {count})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        count: usize,
    },
}

impl NlistError {
    /// Returns `true` when the failure was a user cancellation rather than a fault.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Export(ExportError::Cancelled(_)))
    }
}

/// Convenience type alias for results using [`NlistError`].
pub type Result<T> = std::result::Result<T, NlistError>;
