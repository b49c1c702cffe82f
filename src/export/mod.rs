//! Export of a classified 2D mesh to the fixed-column nlist text format.

mod debug_log;
pub mod format;
mod progress;
mod writer;

pub use debug_log::DebugLog;
pub use progress::{CancelFlag, NoProgress, ProgressMonitor};
pub use writer::{NlistWriter, HEADER_TAG, NODE_SUBTYPE};

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::classify::{MeshAggregate, MeshAggregator};
use crate::error::{ExportError, Result};
use crate::model::{ConditionCatalog, MeshModel};

/// File extension of nlist documents.
pub const FILE_EXTENSION: &str = "nlist";

/// Settings supplied by the host environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Write the companion debug log.
    pub create_log: bool,
    /// Inserted verbatim into the header line.
    pub app_name_and_version: String,
    /// Host name inserted verbatim into the header line.
    pub app_machine: String,
    /// Header timestamp; `None` uses the current local time.
    pub timestamp: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            create_log: false,
            app_name_and_version: "Pointwise".into(),
            app_machine: "Unknown".into(),
            timestamp: None,
        }
    }
}

impl ExportConfig {
    /// The header timestamp, formatted `YYYY-mm-dd HH:MM:SS`.
    #[must_use]
    pub fn timestamp_text(&self) -> String {
        self.timestamp.clone().unwrap_or_else(|| {
            chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
    }
}

/// Progress of an export through its passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportStage {
    Init,
    EdgeStreamed,
    HeaderWritten,
    NodesWritten,
    FacesWritten,
    GeometryWritten,
    Done,
    Failed,
}

/// Counts reported by a finished export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub vertices: usize,
    pub face_lines: usize,
    pub geometry_edges: usize,
}

/// One export run, advanced a pass at a time.
///
/// Every pass requires the previous one to have succeeded. Any failure moves
/// the session to [`ExportStage::Failed`] and no further writes happen.
/// Bytes already written are not rolled back.
pub struct ExportSession<'a, M: MeshModel + ?Sized, W: Write> {
    model: &'a M,
    catalog: &'a ConditionCatalog,
    config: &'a ExportConfig,
    writer: NlistWriter<W>,
    log: Option<DebugLog<'a>>,
    progress: &'a mut dyn ProgressMonitor,
    stage: ExportStage,
    aggregate: Option<MeshAggregate>,
    summary: ExportSummary,
}

impl<'a, M: MeshModel + ?Sized, W: Write> ExportSession<'a, M, W> {
    /// Starts a session. The log preamble is written here when logging is
    /// enabled and a log sink is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the log preamble cannot be written.
    pub fn new(
        model: &'a M,
        catalog: &'a ConditionCatalog,
        config: &'a ExportConfig,
        out: W,
        log: Option<&'a mut dyn Write>,
        progress: &'a mut dyn ProgressMonitor,
    ) -> Result<Self> {
        let mut log = log.filter(|_| config.create_log).map(DebugLog::new);
        if let Some(log) = log.as_mut() {
            log.write_preamble()?;
        }
        Ok(Self {
            model,
            catalog,
            config,
            writer: NlistWriter::new(out),
            log,
            progress,
            stage: ExportStage::Init,
            aggregate: None,
            summary: ExportSummary::default(),
        })
    }

    #[must_use]
    pub fn stage(&self) -> ExportStage {
        self.stage
    }

    /// The aggregation result, once the edges have been streamed.
    #[must_use]
    pub fn aggregate(&self) -> Option<&MeshAggregate> {
        self.aggregate.as_ref()
    }

    /// Classifies every vertex from the mesh edge stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not at [`ExportStage::Init`] or an
    /// edge cannot be classified.
    pub fn stream_edges(&mut self) -> Result<()> {
        self.advance(ExportStage::Init, ExportStage::EdgeStreamed, |s| {
            s.aggregate = Some(MeshAggregator::run(s.model, s.catalog)?);
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Returns an error if the edges have not been streamed or the sink fails.
    pub fn write_header(&mut self) -> Result<()> {
        self.advance(ExportStage::EdgeStreamed, ExportStage::HeaderWritten, |s| {
            s.writer.write_header(
                &s.config.app_name_and_version,
                &s.config.timestamp_text(),
                &s.config.app_machine,
            )
        })
    }

    /// # Errors
    ///
    /// Returns an error if the header has not been written or the node pass fails.
    pub fn write_nodes(&mut self) -> Result<()> {
        self.advance(ExportStage::HeaderWritten, ExportStage::NodesWritten, |s| {
            let aggregate = s.aggregate.as_ref().ok_or(ExportError::OutOfOrder {
                expected: ExportStage::EdgeStreamed,
                actual: ExportStage::Init,
            })?;
            s.summary.vertices =
                s.writer
                    .write_nodes(s.model, aggregate, &mut *s.progress, s.log.as_mut())?;
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Returns an error if the nodes have not been written or the face pass fails.
    pub fn write_faces(&mut self) -> Result<()> {
        self.advance(ExportStage::NodesWritten, ExportStage::FacesWritten, |s| {
            s.summary.face_lines = s.writer.write_faces(s.model, &mut *s.progress)?;
            Ok(())
        })
    }

    /// # Errors
    ///
    /// Returns an error if the faces have not been written or the geometry pass fails.
    pub fn write_geometry(&mut self) -> Result<()> {
        self.advance(ExportStage::FacesWritten, ExportStage::GeometryWritten, |s| {
            let aggregate = s.aggregate.as_ref().ok_or(ExportError::OutOfOrder {
                expected: ExportStage::EdgeStreamed,
                actual: ExportStage::Init,
            })?;
            s.summary.geometry_edges =
                s.writer
                    .write_geometry(s.model, aggregate, &mut *s.progress, s.log.as_mut())?;
            Ok(())
        })
    }

    /// Flushes the sinks and completes the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the geometry has not been written or a flush fails.
    pub fn finish(&mut self) -> Result<ExportSummary> {
        self.advance(ExportStage::GeometryWritten, ExportStage::Done, |s| {
            s.writer.flush()?;
            if let Some(log) = s.log.as_mut() {
                log.flush()?;
            }
            Ok(s.summary)
        })
    }

    /// Runs every remaining pass in order.
    ///
    /// # Errors
    ///
    /// Returns the first failure; later passes are not attempted.
    pub fn run(mut self) -> Result<ExportSummary> {
        self.stream_edges()?;
        self.write_header()?;
        self.write_nodes()?;
        self.write_faces()?;
        self.write_geometry()?;
        let summary = self.finish()?;
        info!(
            vertices = summary.vertices,
            face_lines = summary.face_lines,
            geometry_edges = summary.geometry_edges,
            "nlist export complete"
        );
        Ok(summary)
    }

    /// Returns the output sink.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn advance<T>(
        &mut self,
        expected: ExportStage,
        next: ExportStage,
        pass: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.stage != expected {
            return Err(ExportError::OutOfOrder {
                expected,
                actual: self.stage,
            }
            .into());
        }
        match pass(self) {
            Ok(value) => {
                self.stage = next;
                Ok(value)
            }
            Err(err) => {
                self.stage = ExportStage::Failed;
                if err.is_cancelled() {
                    warn!(stage = ?expected, "nlist export cancelled, output is incomplete");
                } else {
                    error!(stage = ?expected, %err, "nlist export failed");
                }
                Err(err)
            }
        }
    }
}

/// Exports a mesh model as an nlist document.
pub struct ExportNlist {
    config: ExportConfig,
}

impl ExportNlist {
    /// Creates a new `ExportNlist` operation.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Executes the export into `out`, mirroring records into `log` when
    /// the configuration enables it.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any pass.
    pub fn execute<'a, M: MeshModel + ?Sized, W: Write>(
        &'a self,
        model: &'a M,
        catalog: &'a ConditionCatalog,
        out: W,
        log: Option<&'a mut dyn Write>,
        progress: &'a mut dyn ProgressMonitor,
    ) -> Result<ExportSummary> {
        ExportSession::new(model, catalog, &self.config, out, log, progress)?.run()
    }

    /// Executes the export into the file at `path`; the companion log, when
    /// enabled, goes to `<path>.log`.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be created or any pass fails.
    pub fn execute_to_path<M: MeshModel + ?Sized>(
        &self,
        model: &M,
        catalog: &ConditionCatalog,
        path: &Path,
        progress: &mut dyn ProgressMonitor,
    ) -> Result<ExportSummary> {
        let out = BufWriter::new(File::create(path)?);
        let mut log = if self.config.create_log {
            Some(BufWriter::new(File::create(log_path(path))?))
        } else {
            None
        };
        self.execute(
            model,
            catalog,
            out,
            log.as_mut().map(|l| l as &mut dyn Write),
            progress,
        )
    }
}

/// `<path>.log`
#[must_use]
pub fn log_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".log");
    PathBuf::from(name)
}
