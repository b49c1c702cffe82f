use std::io::Write;

use tracing::{debug, warn};

use crate::classify::{MeshAggregate, VertexRecord};
use crate::error::{ExportError, Result, TopologyError};
use crate::math::Point2;
use crate::model::{material_letter, ElementType, IdValue, MeshModel, VertexIndex};

use super::debug_log::DebugLog;
use super::format::sci;
use super::progress::ProgressMonitor;

/// First line of every document.
pub const HEADER_TAG: &str = "POINTWISE";

/// Node section subtype marking a Pointwise generated file.
pub const NODE_SUBTYPE: u32 = 5;

/// Writes the sections of an nlist document to a byte sink.
pub struct NlistWriter<W: Write> {
    out: W,
}

impl<W: Write> NlistWriter<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Writes the tag line and the `Created by` line.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink fails.
    pub fn write_header(&mut self, app: &str, timestamp: &str, machine: &str) -> Result<()> {
        writeln!(self.out, "{HEADER_TAG}")?;
        writeln!(self.out, "Created by {app} on {timestamp} ({machine})")?;
        Ok(())
    }

    /// Writes the node section: one two-line record per vertex, in vertex
    /// index order. Returns the number of nodes written.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex has no record or exactly one neighbor, if
    /// the sink fails, or if the user cancels.
    pub fn write_nodes<M: MeshModel + ?Sized>(
        &mut self,
        model: &M,
        aggregate: &MeshAggregate,
        progress: &mut dyn ProgressMonitor,
        log: Option<&mut DebugLog<'_>>,
    ) -> Result<usize> {
        let count = model.vertex_count();
        writeln!(
            self.out,
            "{count:7} {NODE_SUBTYPE:5}          ***** NODES *****"
        )?;
        step(progress, count, "nodes", |progress| {
            self.node_records(model, aggregate, progress, log)
        })?;
        Ok(count)
    }

    fn node_records<M: MeshModel + ?Sized>(
        &mut self,
        model: &M,
        aggregate: &MeshAggregate,
        progress: &mut dyn ProgressMonitor,
        mut log: Option<&mut DebugLog<'_>>,
    ) -> Result<()> {
        for index in 0..model.vertex_count() {
            let vertex = VertexIndex::try_from(index).map_err(|_| {
                TopologyError::InvalidTopology(format!("vertex {index} exceeds the index range"))
            })?;
            let record = aggregate
                .record(vertex)
                .ok_or(ExportError::MissingVertexInfo(vertex))?;
            let point = coordinates(model, vertex)?;
            self.write_node(vertex, &point, record)?;
            if let Some(log) = log.as_deref_mut() {
                log.node(vertex, &point, record)?;
            }
            if !progress.increment() {
                return Err(ExportError::Cancelled("nodes").into());
            }
        }
        Ok(())
    }

    fn write_node(&mut self, vertex: VertexIndex, point: &Point2, record: &VertexRecord) -> Result<()> {
        if record.neighbor_count() == 1 {
            return Err(ExportError::UnresolvedVertex {
                vertex,
                reason: "exactly one neighbor",
            }
            .into());
        }
        let material = record.material();
        let zone = record.zone();
        if !material.id.is_defined() || !zone.id.is_defined() {
            warn!(vertex, material = %material.id, zone = %zone.id, "vertex has no material or zone");
        } else if material.had_conflict || zone.had_conflict {
            debug!(vertex, material = %material.id, zone = %zone.id, "vertex had conflicting ids");
        }

        writeln!(
            self.out,
            "{}{}{:5} {:2} {} {:2}{:2}",
            sci(point.x, 21, 14),
            sci(point.y, 21, 14),
            record.neighbor_count(),
            material.id.0,
            material_letter(material.id),
            u8::from(record.is_boundary()),
            zone.id.0,
        )?;
        for &neighbor in record.neighbors() {
            write!(self.out, "{:7}", u64::from(neighbor) + 1)?;
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Writes the face section. Triangles become one 4-column line with the
    /// last index repeated; quads become two such lines split along the
    /// `0-2` diagonal. Returns the number of face lines written.
    ///
    /// # Errors
    ///
    /// Returns an error on an element that is neither a tri nor a quad, if
    /// the sink fails, or if the user cancels.
    pub fn write_faces<M: MeshModel + ?Sized>(
        &mut self,
        model: &M,
        progress: &mut dyn ProgressMonitor,
    ) -> Result<usize> {
        let mut lines = 0;
        for index in 0..model.element_count() {
            lines += match model.element(index).map(|e| e.kind) {
                Some(ElementType::Tri) => 1,
                Some(ElementType::Quad) => 2,
                _ => return Err(ExportError::UnexpectedElement("faces").into()),
            };
        }
        writeln!(self.out, "{lines:7}        ***** FACES *****")?;
        step(progress, model.element_count(), "faces", |progress| {
            for index in 0..model.element_count() {
                let element = model
                    .element(index)
                    .ok_or_else(|| TopologyError::EntityNotFound(format!("element {index}")))?;
                match *element.vertices.as_slice() {
                    [n0, n1, n2] => self.write_face(n0, n1, n2)?,
                    [n0, n1, n2, n3] => {
                        self.write_face(n0, n1, n2)?;
                        self.write_face(n0, n2, n3)?;
                    }
                    _ => return Err(ExportError::UnexpectedElement("faces").into()),
                }
                if !progress.increment() {
                    return Err(ExportError::Cancelled("faces").into());
                }
            }
            Ok(())
        })?;
        Ok(lines)
    }

    fn write_face(&mut self, n0: VertexIndex, n1: VertexIndex, n2: VertexIndex) -> Result<()> {
        let [a, b, c] = [n0, n1, n2].map(|n| u64::from(n) + 1);
        writeln!(self.out, "{a:7}{b:7}{c:7}{c:7}")?;
        Ok(())
    }

    /// Writes the geometry section: one line of endpoint coordinates per
    /// geometry edge, in discovery order. Returns the number of edges written.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint has no coordinates, if the sink
    /// fails, or if the user cancels.
    pub fn write_geometry<M: MeshModel + ?Sized>(
        &mut self,
        model: &M,
        aggregate: &MeshAggregate,
        progress: &mut dyn ProgressMonitor,
        mut log: Option<&mut DebugLog<'_>>,
    ) -> Result<usize> {
        let edges = aggregate.geometry_edges();
        writeln!(self.out, "{:7}          ***** GEOMETRY *****", edges.len())?;
        step(progress, edges.len(), "geometry", |progress| {
            for edge in edges {
                let p0 = coordinates(model, edge.v0)?;
                let p1 = coordinates(model, edge.v1)?;
                writeln!(
                    self.out,
                    "{}{}{}{}",
                    sci(p0.x, 13, 5),
                    sci(p0.y, 13, 5),
                    sci(p1.x, 13, 5),
                    sci(p1.y, 13, 5)
                )?;
                if let Some(log) = log.as_deref_mut() {
                    log.edge(edge.v0, &p0, edge.v1, &p1)?;
                }
                if !progress.increment() {
                    return Err(ExportError::Cancelled("geometry").into());
                }
            }
            Ok(())
        })?;
        Ok(edges.len())
    }

    /// Flushes the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Returns the sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn coordinates<M: MeshModel + ?Sized>(model: &M, vertex: VertexIndex) -> Result<Point2> {
    model
        .vertex(vertex)
        .ok_or_else(|| TopologyError::EntityNotFound(format!("vertex {vertex}")).into())
}

/// Runs one progress step, always closing it.
fn step(
    progress: &mut dyn ProgressMonitor,
    total: usize,
    pass: &'static str,
    body: impl FnOnce(&mut dyn ProgressMonitor) -> Result<()>,
) -> Result<()> {
    let result = if progress.begin_step(total) {
        body(&mut *progress)
    } else {
        Err(ExportError::Cancelled(pass).into())
    };
    progress.end_step();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::MeshAggregator;
    use crate::export::NoProgress;
    use crate::model::{BlockData, Condition, ConditionCatalog, GridModel};
    use crate::NlistError;

    fn text(writer: NlistWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    fn quad_model() -> GridModel {
        let mut model = GridModel::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            model.add_vertex(Point2::new(x, y)).unwrap();
        }
        let block = model.add_block(BlockData::new("core", Some(Condition::new(2, 1))));
        model.add_face(block, &[0, 1, 2, 3]).unwrap();
        model
    }

    #[test]
    fn header_lines() {
        let mut writer = NlistWriter::new(Vec::new());
        writer
            .write_header("Pointwise V18", "2021-06-01 12:00:00", "host")
            .unwrap();
        assert_eq!(
            text(writer),
            "POINTWISE\nCreated by Pointwise V18 on 2021-06-01 12:00:00 (host)\n"
        );
    }

    #[test]
    fn quad_splits_into_two_lines() {
        let model = quad_model();
        let mut writer = NlistWriter::new(Vec::new());
        let lines = writer.write_faces(&model, &mut NoProgress).unwrap();
        assert_eq!(lines, 2);
        assert_eq!(
            text(writer),
            "      2        ***** FACES *****\n\
             \x20     1      2      3      3\n\
             \x20     1      3      4      4\n"
        );
    }

    #[test]
    fn many_neighbors_on_one_line() {
        let mut record = VertexRecord::new();
        for n in 0..9 {
            record.push(n, crate::model::MatZone::new(12, 3), crate::classify::Evidence::Volume, false);
        }
        let mut writer = NlistWriter::new(Vec::new());
        writer.write_node(0, &Point2::new(0.685, 3.145), &record).unwrap();
        assert_eq!(
            text(writer),
            " 6.85000000000000E-01 3.14500000000000E+00    9 12 C  0 3\n\
             \x20     1      2      3      4      5      6      7      8      9\n"
        );
    }

    #[test]
    fn single_neighbor_is_unresolved() {
        let mut record = VertexRecord::new();
        record.push(4, crate::model::MatZone::new(0, 0), crate::classify::Evidence::Volume, true);
        let mut writer = NlistWriter::new(Vec::new());
        assert!(matches!(
            writer.write_node(3, &Point2::origin(), &record),
            Err(NlistError::Export(ExportError::UnresolvedVertex { vertex: 3, .. }))
        ));
    }

    #[test]
    fn unreferenced_vertex_is_missing_info() {
        let mut model = quad_model();
        model.add_vertex(Point2::new(5.0, 5.0)).unwrap();
        let catalog = ConditionCatalog::new();
        let aggregate = MeshAggregator::run(&model, &catalog).unwrap();
        let mut writer = NlistWriter::new(Vec::new());
        let err = writer
            .write_nodes(&model, &aggregate, &mut NoProgress, None)
            .unwrap_err();
        assert!(matches!(
            err,
            NlistError::Export(ExportError::MissingVertexInfo(4))
        ));
    }

    struct CancelAfter(usize);

    impl ProgressMonitor for CancelAfter {
        fn increment(&mut self) -> bool {
            self.0 = self.0.saturating_sub(1);
            self.0 > 0
        }
    }

    #[test]
    fn cancellation_stops_the_pass() {
        let model = quad_model();
        let catalog = ConditionCatalog::new();
        let aggregate = MeshAggregator::run(&model, &catalog).unwrap();
        let mut writer = NlistWriter::new(Vec::new());
        let err = writer
            .write_geometry(&model, &aggregate, &mut CancelAfter(2), None)
            .unwrap_err();
        assert!(err.is_cancelled());
        // header plus the two edges written before the signal was seen
        assert_eq!(text(writer).lines().count(), 3);
    }
}
