//! JSON mesh description, the input format of the `nlist` binary.
//!
//! ```json
//! {
//!   "vertices": [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
//!   "blocks": [{ "name": "core", "condition": { "type": "Material-1", "zone": 1 } }],
//!   "faces": [{ "block": 0, "vertices": [0, 1, 2, 3] }],
//!   "domains": [{ "name": "wall", "condition": { "type": "Material-2", "zone": 5 },
//!                 "edges": [[0, 1]] }]
//! }
//! ```

use std::io::Read;

use serde::Deserialize;

use crate::error::{DescriptionError, Result};
use crate::math::Point2;

use super::{BlockData, Condition, ConditionCatalog, DomainData, GridModel, VertexIndex};

/// A condition given by physical type name and zone.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConditionSpec {
    #[serde(rename = "type")]
    pub physical_type: String,
    pub zone: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub condition: Option<ConditionSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FaceSpec {
    pub block: usize,
    pub vertices: Vec<VertexIndex>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DomainSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub condition: Option<ConditionSpec>,
    pub edges: Vec<[VertexIndex; 2]>,
}

/// A complete 2D mesh with its block and domain conditions.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MeshDescription {
    pub vertices: Vec<[f64; 2]>,
    pub blocks: Vec<BlockSpec>,
    pub faces: Vec<FaceSpec>,
    #[serde(default)]
    pub domains: Vec<DomainSpec>,
}

impl MeshDescription {
    /// Parses a description from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid description.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| DescriptionError::Parse(e).into())
    }

    /// Parses a description from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid description.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| DescriptionError::Parse(e).into())
    }

    /// Builds the grid model, resolving physical type names through `catalog`.
    ///
    /// # Errors
    ///
    /// Returns an error on an unknown physical type, an out-of-range block
    /// or vertex reference, or a malformed face.
    pub fn build(&self, catalog: &ConditionCatalog) -> Result<GridModel> {
        let mut model = GridModel::new();
        for &[x, y] in &self.vertices {
            model.add_vertex(Point2::new(x, y))?;
        }

        let mut blocks = Vec::with_capacity(self.blocks.len());
        for spec in &self.blocks {
            let condition = resolve_condition(spec.condition.as_ref(), catalog)?;
            blocks.push(model.add_block(BlockData::new(spec.name.clone(), condition)));
        }

        for face in &self.faces {
            let &block = blocks
                .get(face.block)
                .ok_or(DescriptionError::IndexOutOfRange {
                    what: "block",
                    index: face.block,
                    count: blocks.len(),
                })?;
            model.add_face(block, &face.vertices)?;
        }

        let vertex_count = self.vertices.len();
        for spec in &self.domains {
            let condition = resolve_condition(spec.condition.as_ref(), catalog)?;
            let mut domain = DomainData::new(spec.name.clone(), condition);
            for &[a, b] in &spec.edges {
                for v in [a, b] {
                    let index = usize::try_from(v).unwrap_or(usize::MAX);
                    if index >= vertex_count {
                        return Err(DescriptionError::IndexOutOfRange {
                            what: "vertex",
                            index,
                            count: vertex_count,
                        }
                        .into());
                    }
                }
                domain.add_edge(a, b);
            }
            model.add_domain(domain);
        }
        Ok(model)
    }
}

fn resolve_condition(
    spec: Option<&ConditionSpec>,
    catalog: &ConditionCatalog,
) -> Result<Option<Condition>> {
    let Some(spec) = spec else {
        return Ok(None);
    };
    let type_id = catalog
        .lookup(&spec.physical_type)
        .ok_or_else(|| DescriptionError::UnknownPhysicalType(spec.physical_type.clone()))?;
    Ok(Some(Condition::new(type_id, spec.zone)))
}
