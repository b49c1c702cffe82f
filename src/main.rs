//! `nlist`: exports a 2D mesh description as an nlist node-list document.
//!
//! ```text
//! nlist mesh.json                        # writes mesh.nlist
//! nlist mesh.json -o out.nlist --create-log
//! RUST_LOG=nlist=debug nlist mesh.json
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use nlist::export::{NoProgress, FILE_EXTENSION};
use nlist::{ConditionCatalog, ExportConfig, ExportNlist, MeshDescription};

/// Export a 2D mesh description to the nlist format.
#[derive(Parser)]
#[command(name = "nlist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "2D mesh node-list exporter", long_about = None)]
struct Cli {
    /// Mesh description (JSON).
    mesh: PathBuf,

    /// Output file; defaults to the input path with the `.nlist` extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a debug log to `<output>.log`.
    #[arg(long)]
    create_log: bool,

    /// Application name and version for the header line.
    #[arg(long, default_value = "Pointwise")]
    app: String,

    /// Machine name for the header line.
    #[arg(long, default_value = "Unknown")]
    machine: String,

    /// Fixed header timestamp instead of the current time.
    #[arg(long)]
    timestamp: Option<String>,

    /// Print the condition catalog and exit.
    #[arg(long)]
    list_conditions: bool,
}

/// WARN for everything and INFO for nlist, unless `RUST_LOG` is set.
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    EnvFilter::new(rust_log.unwrap_or("warn,nlist=info"))
}

fn main() -> anyhow::Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref()))
        .init();

    let cli = Cli::parse();
    let catalog = ConditionCatalog::new();

    if cli.list_conditions {
        for t in catalog.types() {
            println!("{:3} {}", t.type_id, t.name);
        }
        return Ok(());
    }

    let file = File::open(&cli.mesh)
        .with_context(|| format!("cannot open {}", cli.mesh.display()))?;
    let model = MeshDescription::from_reader(BufReader::new(file))?.build(&catalog)?;

    let output = cli
        .output
        .unwrap_or_else(|| cli.mesh.with_extension(FILE_EXTENSION));
    let config = ExportConfig {
        create_log: cli.create_log,
        app_name_and_version: cli.app,
        app_machine: cli.machine,
        timestamp: cli.timestamp,
    };

    let summary = ExportNlist::new(config)
        .execute_to_path(&model, &catalog, &output, &mut NoProgress)
        .with_context(|| format!("export to {} failed", output.display()))?;
    println!(
        "{}: {} nodes, {} faces, {} geometry edges",
        output.display(),
        summary.vertices,
        summary.face_lines,
        summary.geometry_edges
    );
    Ok(())
}
