pub mod classify;
pub mod error;
pub mod export;
pub mod math;
pub mod model;

pub use classify::{MeshAggregate, MeshAggregator};
pub use error::{NlistError, Result};
pub use export::{ExportConfig, ExportNlist, ExportSummary};
pub use model::{ConditionCatalog, GridModel, MeshDescription, MeshModel};
