use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, TopologyError};
use crate::model::{
    ConditionCatalog, EdgeStreamData, EdgeStreamHandler, MeshModel, StreamBegin, StreamEnd,
    VertexIndex,
};

use super::edge_classifier::EdgeClassifier;
use super::vertex_record::VertexRecord;

/// A boundary or material/zone interface segment selected for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryEdge {
    pub v0: VertexIndex,
    pub v1: VertexIndex,
}

/// Result of a full edge-stream pass: one record per referenced vertex and
/// the geometry edges in discovery order.
#[derive(Debug, Clone, Default)]
pub struct MeshAggregate {
    records: BTreeMap<VertexIndex, VertexRecord>,
    geometry_edges: Vec<GeometryEdge>,
}

impl MeshAggregate {
    /// The record of a vertex, if any edge referenced it.
    #[must_use]
    pub fn record(&self, vertex: VertexIndex) -> Option<&VertexRecord> {
        self.records.get(&vertex)
    }

    /// All records in ascending vertex order.
    pub fn records(&self) -> impl Iterator<Item = (VertexIndex, &VertexRecord)> {
        self.records.iter().map(|(&v, r)| (v, r))
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn geometry_edges(&self) -> &[GeometryEdge] {
        &self.geometry_edges
    }
}

/// Folds a mesh edge stream into per-vertex records.
///
/// Each edge pushes its classification to both endpoints, each receiving
/// the other as a neighbor.
pub struct MeshAggregator<'a, M: MeshModel + ?Sized> {
    classifier: EdgeClassifier<'a, M>,
    aggregate: MeshAggregate,
}

impl<'a, M: MeshModel + ?Sized> MeshAggregator<'a, M> {
    /// Creates a new aggregator classifying against `model`.
    #[must_use]
    pub fn new(model: &'a M, catalog: &'a ConditionCatalog) -> Self {
        Self {
            classifier: EdgeClassifier::new(model, catalog),
            aggregate: MeshAggregate::default(),
        }
    }

    /// Streams every edge of `model` and returns the frozen aggregate.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream fails or an edge cannot be classified.
    pub fn run(model: &'a M, catalog: &'a ConditionCatalog) -> Result<MeshAggregate> {
        let mut aggregator = Self::new(model, catalog);
        model.stream_edges(&mut aggregator)?;
        Ok(aggregator.finish())
    }

    /// Consumes the aggregator, returning what it has accumulated.
    #[must_use]
    pub fn finish(self) -> MeshAggregate {
        self.aggregate
    }
}

impl<M: MeshModel + ?Sized> EdgeStreamHandler for MeshAggregator<'_, M> {
    fn stream_begin(&mut self, data: &StreamBegin) -> Result<()> {
        self.aggregate.geometry_edges.clear();
        self.aggregate
            .geometry_edges
            .reserve(data.boundary_edge_count * 2);
        Ok(())
    }

    fn stream_edge(&mut self, data: &EdgeStreamData) -> Result<()> {
        let class = self.classifier.classify(data)?;
        let &[v0, v1] = data.element.vertices.as_slice() else {
            return Err(TopologyError::InvalidTopology("edge is not a 2-vertex bar".into()).into());
        };
        if !class.context_resolved {
            return Err(TopologyError::InvalidTopology(format!(
                "{:?} edge ({v0}, {v1}) has no resolvable neighbor block",
                data.kind
            ))
            .into());
        }

        let is_boundary = data.kind == crate::model::EdgeKind::Boundary;
        for (vertex, neighbor) in [(v0, v1), (v1, v0)] {
            self.aggregate
                .records
                .entry(vertex)
                .or_default()
                .push(neighbor, class.ids, class.evidence, is_boundary);
        }
        if class.geometry {
            self.aggregate.geometry_edges.push(GeometryEdge { v0, v1 });
        }
        Ok(())
    }

    fn stream_end(&mut self, data: &StreamEnd) -> Result<()> {
        debug!(
            completed = data.completed,
            vertices = self.aggregate.records.len(),
            geometry_edges = self.aggregate.geometry_edges.len(),
            "edge stream finished"
        );
        Ok(())
    }
}
