//! Conversion configuration
//!
//! [`ShapeConfig`] controls how elements are shaped and [`ConvertOptions`]
//! controls how the converter reads and writes. Both deserialize from JSON
//! with every field optional:
//!
//! ```json
//! {
//!   "address_prefix": "addr:",
//!   "street_abbreviations": { "Hwy": "Highway" },
//!   "expected_street_types": ["Street", "Highway"]
//! }
//! ```

use crate::error::{ConvertError, Result};
use crate::osm::street::{StreetNameNormalizer, EXPECTED_STREET_TYPES, STREET_ABBREVIATIONS};
use crate::reader::buffered::DEFAULT_BUFFER_SIZE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Shaping rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShapeConfig {
    /// Tag-key prefix routed into the `address` sub-object
    pub address_prefix: String,
    /// Address component that gets street-name normalization
    pub street_component: String,
    /// Address component that gets postal-code normalization
    pub postcode_component: String,
    pub street_abbreviations: BTreeMap<String, String>,
    pub expected_street_types: Vec<String>,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        ShapeConfig {
            address_prefix: "addr:".to_owned(),
            street_component: "street".to_owned(),
            postcode_component: "postcode".to_owned(),
            street_abbreviations: STREET_ABBREVIATIONS
                .iter()
                .map(|&(abbr, full)| (abbr.to_owned(), full.to_owned()))
                .collect(),
            expected_street_types: EXPECTED_STREET_TYPES.iter().map(|&s| s.to_owned()).collect(),
        }
    }
}

impl ShapeConfig {
    /// Load from a JSON file and validate
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: ShapeConfig = serde_json::from_str(&text)
            .map_err(|e| ConvertError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.address_prefix.is_empty() {
            return Err(ConvertError::Config("address_prefix must not be empty".into()));
        }
        for (name, component) in [
            ("street_component", &self.street_component),
            ("postcode_component", &self.postcode_component),
        ] {
            if component.is_empty() || component.contains(':') {
                return Err(ConvertError::Config(format!(
                    "{name} must be a single non-empty key component, got {component:?}"
                )));
            }
        }
        if let Some(abbr) = self
            .street_abbreviations
            .keys()
            .find(|k| k.is_empty() || k.contains(char::is_whitespace))
        {
            return Err(ConvertError::Config(format!(
                "street abbreviation {abbr:?} must be a single token"
            )));
        }
        Ok(())
    }

    pub fn street_normalizer(&self) -> StreetNameNormalizer {
        StreetNameNormalizer::new(
            self.street_abbreviations.clone(),
            self.expected_street_types.iter().cloned(),
        )
    }
}

/// Reader and writer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    /// Indent the JSON output
    pub pretty: bool,
    /// Initial read buffer capacity in bytes
    pub buffer_size: usize,
    /// Keep every dropped-tag diagnostic in the report; grows with the input
    pub collect_diagnostics: bool,
    /// Keep every document in memory and write the array once at the end
    pub buffer_documents: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            pretty: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
            collect_diagnostics: false,
            buffer_documents: false,
        }
    }
}

impl ConvertOptions {
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(ConvertError::Config("buffer_size must be positive".into()));
        }
        Ok(())
    }
}
