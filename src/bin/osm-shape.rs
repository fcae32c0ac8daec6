use anyhow::Context;
use clap::Parser;
use osm_shape::{ConvertOptions, ShapeConfig};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "osm-shape")]
#[command(about = "Shape an OpenStreetMap XML extract into a JSON array for document-store loading")]
struct Args {
    /// OSM XML file to convert
    input: PathBuf,

    /// Output file (defaults to <INPUT>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// JSON file overriding the shaping rules
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Hold every document in memory and write the array once at the end
    #[arg(long)]
    buffered: bool,

    /// Write the conversion report as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Print street types that were not spelled out, with example values
    #[arg(long)]
    audit_streets: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "loading shaping rules");
            ShapeConfig::from_path(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => ShapeConfig::default(),
    };
    let options = ConvertOptions {
        pretty: args.pretty,
        buffer_documents: args.buffered,
        collect_diagnostics: args.report.is_some(),
        ..ConvertOptions::default()
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| osm_shape::output_path_for(&args.input));
    let report = osm_shape::convert_file(&args.input, &output, &config, options)
        .with_context(|| format!("converting {}", args.input.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &report.key_counts)?;
    writeln!(out)?;

    if args.audit_streets {
        if report.street_audit.is_empty() {
            writeln!(out, "no unexpected street types")?;
        }
        for (street_type, names) in report.street_audit.iter() {
            writeln!(out, "{street_type}:")?;
            for name in names {
                writeln!(out, "  {name}")?;
            }
        }
    }

    if report.key_counts.problemchars > 0 {
        warn!(
            count = report.key_counts.problemchars,
            "keys with problem characters were dropped"
        );
    }

    if let Some(path) = &args.report {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        report.write_json(&mut writer, true)?;
        writer.flush()?;
    }

    Ok(())
}
