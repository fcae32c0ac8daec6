//! Conversion summaries
//!
//! Everything the converter learns about a source besides the documents
//! themselves, gathered in the same single pass.

use crate::osm::{Diagnostic, KeyClassCounts, ShapedDocument};
use crate::error::Result;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// Occurrences of each element name in the source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ElementCounts(BTreeMap<String, u64>);

impl ElementCounts {
    pub fn record(&mut self, name: &str) {
        match self.0.get_mut(name) {
            Some(count) => *count += 1,
            None => {
                self.0.insert(name.to_owned(), 1);
            }
        }
    }

    pub fn get(&self, name: &str) -> u64 {
        self.0.get(name).copied().unwrap_or(0)
    }
}

/// Street values whose trailing type is not spelled out, keyed by that type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StreetAudit(BTreeMap<String, BTreeSet<String>>);

impl StreetAudit {
    pub fn record(&mut self, street_type: &str, original: &str) {
        self.0
            .entry(street_type.to_owned())
            .or_default()
            .insert(original.to_owned());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, street_type: &str) -> Option<&BTreeSet<String>> {
        self.0.get(street_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.0.iter().map(|(t, names)| (t.as_str(), names))
    }
}

/// Summary of one conversion run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionReport {
    pub key_counts: KeyClassCounts,
    pub element_counts: ElementCounts,
    pub street_audit: StreetAudit,
    /// Documents produced
    pub documents: u64,
    /// Tags dropped with a diagnostic
    pub dropped_tags: u64,
    /// Address tags dropped silently
    pub ignored_tags: u64,
    /// Empty unless diagnostics were collected
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl ConversionReport {
    pub fn write_json<W: Write>(&self, writer: W, pretty: bool) -> Result<()> {
        if pretty {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_json::to_writer(writer, self)?;
        }
        Ok(())
    }
}

/// Documents held in memory together with their report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    pub documents: Vec<ShapedDocument>,
    pub report: ConversionReport,
}

impl Conversion {
    /// Write the documents as one JSON array
    pub fn write_json<W: Write>(&self, writer: W, pretty: bool) -> Result<()> {
        if pretty {
            serde_json::to_writer_pretty(writer, &self.documents)?;
        } else {
            serde_json::to_writer(writer, &self.documents)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_counts() {
        let mut counts = ElementCounts::default();
        for name in ["node", "tag", "node", "way"] {
            counts.record(name);
        }
        assert_eq!(counts.get("node"), 2);
        assert_eq!(counts.get("relation"), 0);
        assert_eq!(
            serde_json::to_value(&counts).unwrap(),
            json!({"node": 2, "tag": 1, "way": 1})
        );
    }

    #[test]
    fn test_street_audit_dedups() {
        let mut audit = StreetAudit::default();
        audit.record("Rd", "Cole Rd");
        audit.record("Rd", "Cole Rd");
        audit.record("Rd", "Carpenteria Rd");
        audit.record("Real", "El Camino Real");

        assert_eq!(audit.iter().count(), 2);
        assert!(!audit.is_empty());
        assert_eq!(audit.get("Rd").map(BTreeSet::len), Some(2));
        assert_eq!(
            serde_json::to_value(&audit).unwrap(),
            json!({"Real": ["El Camino Real"], "Rd": ["Carpenteria Rd", "Cole Rd"]})
        );
    }

    #[test]
    fn test_report_json_omits_empty_diagnostics() {
        let report = ConversionReport {
            documents: 3,
            ..ConversionReport::default()
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["documents"], 3);
        assert_eq!(
            value["key_counts"],
            json!({"lower": 0, "lower_colon": 0, "problemchars": 0, "other": 0})
        );
        assert!(value.get("diagnostics").is_none());
    }
}
