//! Per-vertex material and zone classification from a mesh edge stream.

mod aggregator;
mod edge_classifier;
mod managed_id;
mod vertex_record;

pub use aggregator::{GeometryEdge, MeshAggregate, MeshAggregator};
pub use edge_classifier::{EdgeClass, EdgeClassifier};
pub use managed_id::ManagedId;
pub use vertex_record::{Evidence, Resolved, VertexRecord};
