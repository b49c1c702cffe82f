use std::io::Write;

use crate::classify::VertexRecord;
use crate::error::Result;
use crate::math::{lift, Point2};
use crate::model::{IdValue, MaterialId, VertexIndex, ZoneId};

use super::format::general;

/// Companion log mirroring every node and geometry edge as a
/// script-sourceable record.
pub struct DebugLog<'a> {
    out: &'a mut dyn Write,
}

impl<'a> DebugLog<'a> {
    #[must_use]
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out }
    }

    /// Writes the preamble describing the `node` and `edge` records.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be written.
    pub fn write_preamble(&mut self) -> Result<()> {
        let out = &mut self.out;
        writeln!(out, "# To process node and edge data in this log file, source")?;
        writeln!(out, "# this log into a script that defines two procs that are")?;
        writeln!(out, "# compatible with the following signatures:")?;
        writeln!(out)?;
        writeln!(
            out,
            "# proc node {{ nodeId pt matId matConflict isBndry zoneId zoneConflict nborIds }} {{"
        )?;
        writeln!(out, "#   your NODE code here!")?;
        writeln!(out, "# }}")?;
        writeln!(out)?;
        writeln!(out, "# proc edge {{ ndx0 pt0 ndx1 pt1 }} {{")?;
        writeln!(out, "#   your GEOM code here!")?;
        writeln!(out, "# }}")?;
        writeln!(out)?;
        writeln!(out, "# source {{your.nlist.log}}")?;
        writeln!(out)?;
        writeln!(out, "set UndefinedMatId {}", MaterialId::UNDEFINED)?;
        writeln!(out, "set UndefinedZoneId {}", ZoneId::UNDEFINED)?;
        writeln!(out)?;
        Ok(())
    }

    /// `node <1-based index> {x y z} mat matConflict bndry zone zoneConflict {nbors}`
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be written.
    pub fn node(&mut self, vertex: VertexIndex, point: &Point2, record: &VertexRecord) -> Result<()> {
        let material = record.material();
        let zone = record.zone();
        let neighbors = record
            .neighbors()
            .iter()
            .map(|n| (u64::from(*n) + 1).to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(
            self.out,
            "node {} {} {} {} {} {} {} {{{neighbors}}}",
            u64::from(vertex) + 1,
            braced(point),
            material.id,
            u8::from(material.had_conflict),
            u8::from(record.is_boundary()),
            zone.id,
            u8::from(zone.had_conflict),
        )?;
        Ok(())
    }

    /// `edge <index> {x y z} <index> {x y z}`
    ///
    /// Edge indices are 0-based, unlike the 1-based `node` ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be written.
    pub fn edge(
        &mut self,
        v0: VertexIndex,
        p0: &Point2,
        v1: VertexIndex,
        p1: &Point2,
    ) -> Result<()> {
        writeln!(
            self.out,
            "edge {} {} {} {}",
            v0,
            braced(p0),
            v1,
            braced(p1)
        )?;
        Ok(())
    }

    /// Flushes the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

fn braced(point: &Point2) -> String {
    let p = lift(point);
    format!("{{{} {} {}}}", general(p.x), general(p.y), general(p.z))
}
