//! Conversion errors
//!
//! Only fatal conditions live here. Problems that drop a single tag are
//! reported as [`Diagnostic`](crate::osm::Diagnostic) values instead.

use std::num::ParseFloatError;

/// Crate result alias
pub type Result<T> = std::result::Result<T, ConvertError>;

/// A failure that aborts the whole conversion
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Reading the source or writing the sink failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The markup could not be parsed
    #[error("malformed markup at byte {position}: {message}")]
    Malformed { message: String, position: u64 },

    /// A `node`/`way` element lacks a mandatory attribute
    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    /// `lat`/`lon` present but not a finite number
    #[error("element {id}: attribute `{attribute}` is not a valid coordinate: {value:?}")]
    InvalidCoordinate {
        id: String,
        attribute: &'static str,
        value: String,
        #[source]
        source: Option<ParseFloatError>,
    },

    /// Encoding a shaped document failed
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Rule tables or options are unusable
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ConvertError {
    pub(crate) fn malformed(message: impl Into<String>, position: u64) -> Self {
        ConvertError::Malformed {
            message: message.into(),
            position,
        }
    }

    /// True for errors caused by the source document rather than I/O
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            ConvertError::Malformed { .. }
                | ConvertError::MissingAttribute { .. }
                | ConvertError::InvalidCoordinate { .. }
        )
    }
}
