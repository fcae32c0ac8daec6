//! osm-shape - OpenStreetMap XML to document-store JSON
//!
//! Pipeline:
//! A: Pull reader over any `Read` source (reader)
//! B: Element shaping with key classification and address cleanup (osm)
//! C: Streaming conversion into a JSON array (convert)
//!
//! ```no_run
//! use osm_shape::{ConvertOptions, ShapeConfig};
//!
//! let (output, report) =
//!     osm_shape::process_map("san-jose.osm", &ShapeConfig::default(), ConvertOptions::default())?;
//! println!("{} documents written to {}", report.documents, output.display());
//! # Ok::<(), osm_shape::ConvertError>(())
//! ```

pub mod config;
pub mod convert;
pub mod core;
pub mod error;
pub mod osm;
pub mod reader;

pub use config::{ConvertOptions, ShapeConfig};
pub use convert::{Conversion, ConversionReport, StreamingConverter};
pub use error::{ConvertError, Result};
pub use osm::{Diagnostic, ElementShaper, KeyClass, KeyClassCounts, ShapedDocument};

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ============================================================================
// File-level Entry Point
// ============================================================================

/// Output path for `input`: the input name with `.json` appended
pub fn output_path_for(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".json");
    PathBuf::from(name)
}

/// Convert the file at `input` into `<input>.json`
///
/// The output file is removed again if the conversion fails.
pub fn process_map(
    input: impl AsRef<Path>,
    config: &ShapeConfig,
    options: ConvertOptions,
) -> Result<(PathBuf, ConversionReport)> {
    let input = input.as_ref();
    let output = output_path_for(input);
    let report = convert_file(input, &output, config, options)?;
    Ok((output, report))
}

/// Convert `input` into `output`, removing `output` on failure
pub fn convert_file(
    input: &Path,
    output: &Path,
    config: &ShapeConfig,
    options: ConvertOptions,
) -> Result<ConversionReport> {
    config.validate()?;
    options.validate()?;
    info!(input = %input.display(), output = %output.display(), "converting");

    let source = BufReader::new(File::open(input)?);
    let sink = BufWriter::new(File::create(output)?);
    let converter = StreamingConverter::with_options(config, options);

    match converter.convert_to_writer(source, sink) {
        Ok(report) => Ok(report),
        Err(err) => {
            if let Err(remove_err) = std::fs::remove_file(output) {
                warn!(output = %output.display(), "could not remove partial output: {remove_err}");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_appends_suffix() {
        assert_eq!(
            output_path_for(Path::new("data/san-jose.osm")),
            PathBuf::from("data/san-jose.osm.json")
        );
        assert_eq!(output_path_for(Path::new("extract")), PathBuf::from("extract.json"));
    }
}
