//! Element shaping
//!
//! Turns one [`RawElement`] into a [`ShapedDocument`]:
//!
//! ```text
//! attributes ──> type / id / visible / pos / created
//! tag children ─┬─ problem character ───────────> dropped + Diagnostic
//!               ├─ address prefix ─┬─ nested separator ──> ignored
//!               │                  ├─ street ──> StreetNameNormalizer
//!               │                  ├─ postcode ──> postcode::normalize
//!               │                  └────────────> address[component]
//!               ├─ reserved field name ─────────> dropped + Diagnostic
//!               └───────────────────────────────> top-level tag
//! nd children ──> node_refs
//! ```
//!
//! The checks are independent and run in that order. Every tag gets a
//! [`TagReport`] so the caller decides what to do with diagnostics.

use super::document::{Created, ShapedDocument, TagMap};
use super::element::{RawElement, Tag};
use super::keys::{classify, find_problem_char, KeyClass};
use super::postcode;
use super::street::StreetNameNormalizer;
use crate::config::ShapeConfig;
use crate::error::{ConvertError, Result};
use serde::Serialize;
use std::fmt;
use tracing::trace;

/// Separator inside descriptive keys
pub const KEY_SEPARATOR: char = ':';

/// Non-fatal problem that cost a tag its place in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Key contains a character that cannot appear in a field name
    ProblemChars {
        element_id: String,
        key: String,
        found: char,
    },
    /// Key would overwrite a structural field of the document
    ReservedKey { element_id: String, key: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ProblemChars {
                element_id,
                key,
                found,
            } => write!(f, "element {element_id}: key {key:?} has problem character {found:?}"),
            Diagnostic::ReservedKey { element_id, key } => {
                write!(f, "element {element_id}: key {key:?} collides with a document field")
            }
        }
    }
}

/// What happened to an address value on its way in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressOutcome {
    Stored,
    /// Street value whose trailing type was not spelled out; `original` is
    /// the value before expansion (it may come out unchanged)
    StreetExpanded { street_type: String, original: String },
    /// Postcode value that was trimmed to its canonical form
    PostcodeTrimmed { original: String },
}

/// Fate of one descriptive tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    /// Stored as a top-level field
    TopLevel,
    /// Stored under `address`
    Address(AddressOutcome),
    /// Dropped, with a diagnostic for the caller
    Dropped(Diagnostic),
    /// Dropped silently (address key with a nested separator)
    Ignored,
}

/// Classification and outcome of one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReport {
    pub key: String,
    pub class: KeyClass,
    pub outcome: TagOutcome,
}

/// A shaped document plus the per-tag reports that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedElement {
    pub document: ShapedDocument,
    pub tags: Vec<TagReport>,
}

/// Shapes raw elements according to a [`ShapeConfig`]
#[derive(Debug, Clone)]
pub struct ElementShaper {
    address_prefix: String,
    street_component: String,
    postcode_component: String,
    street: StreetNameNormalizer,
}

impl ElementShaper {
    pub fn new(config: &ShapeConfig) -> Self {
        ElementShaper {
            address_prefix: config.address_prefix.clone(),
            street_component: config.street_component.clone(),
            postcode_component: config.postcode_component.clone(),
            street: config.street_normalizer(),
        }
    }

    /// Shape one element
    ///
    /// Returns `Ok(None)` for anything that is not a `node` or `way`.
    /// A missing `id`, a `lat` without `lon`, or a coordinate that is not a
    /// finite number fails the element.
    pub fn shape(&self, element: &RawElement) -> Result<Option<ShapedElement>> {
        let Some(kind) = element.kind() else {
            return Ok(None);
        };

        let id = element
            .attribute("id")
            .ok_or_else(|| ConvertError::MissingAttribute {
                element: element.name.clone(),
                attribute: "id",
            })?;

        let mut document = ShapedDocument::new(kind, id);
        document.visible = element.attribute("visible").map(str::to_owned);

        if let Some(lat) = element.attribute("lat") {
            let lon = element
                .attribute("lon")
                .ok_or_else(|| ConvertError::MissingAttribute {
                    element: element.name.clone(),
                    attribute: "lon",
                })?;
            document.pos = Some([
                parse_coordinate(id, "lat", lat)?,
                parse_coordinate(id, "lon", lon)?,
            ]);
        }

        document.created = Created::from_attributes(|name| element.attribute(name));

        let mut address = TagMap::new();
        let mut reports = Vec::with_capacity(element.tags.len());
        for tag in &element.tags {
            let outcome = self.place_tag(id, tag, &mut document.tags, &mut address);
            reports.push(TagReport {
                key: tag.key.clone(),
                class: classify(&tag.key),
                outcome,
            });
        }

        if !address.is_empty() {
            document.address = Some(address);
        }
        if !element.node_refs.is_empty() {
            document.node_refs = Some(element.node_refs.clone());
        }

        trace!(id, kind = kind.as_str(), tags = reports.len(), "shaped element");
        Ok(Some(ShapedElement {
            document,
            tags: reports,
        }))
    }

    fn place_tag(&self, id: &str, tag: &Tag, top_level: &mut TagMap, address: &mut TagMap) -> TagOutcome {
        if let Some(found) = find_problem_char(&tag.key) {
            return TagOutcome::Dropped(Diagnostic::ProblemChars {
                element_id: id.to_owned(),
                key: tag.key.clone(),
                found,
            });
        }

        if let Some(component) = tag.key.strip_prefix(self.address_prefix.as_str()) {
            if component.contains(KEY_SEPARATOR) {
                return TagOutcome::Ignored;
            }
            let (value, outcome) = self.normalize_address(component, &tag.value);
            address.insert(component, value);
            return TagOutcome::Address(outcome);
        }

        if ShapedDocument::is_reserved(&tag.key) {
            return TagOutcome::Dropped(Diagnostic::ReservedKey {
                element_id: id.to_owned(),
                key: tag.key.clone(),
            });
        }

        top_level.insert(tag.key.as_str(), tag.value.as_str());
        TagOutcome::TopLevel
    }

    fn normalize_address(&self, component: &str, value: &str) -> (String, AddressOutcome) {
        if component == self.street_component {
            if let Some(street_type) = self.street.unexpected_street_type(value) {
                let outcome = AddressOutcome::StreetExpanded {
                    street_type: street_type.to_owned(),
                    original: value.to_owned(),
                };
                return (self.street.expand(value), outcome);
            }
        } else if component == self.postcode_component {
            let normalized = postcode::normalize(value);
            if normalized != value {
                let outcome = AddressOutcome::PostcodeTrimmed {
                    original: value.to_owned(),
                };
                return (normalized.into_owned(), outcome);
            }
        }
        (value.to_owned(), AddressOutcome::Stored)
    }
}

impl Default for ElementShaper {
    fn default() -> Self {
        Self::new(&ShapeConfig::default())
    }
}

fn parse_coordinate(id: &str, attribute: &'static str, value: &str) -> Result<f64> {
    let invalid = |source| ConvertError::InvalidCoordinate {
        id: id.to_owned(),
        attribute,
        value: value.to_owned(),
        source,
    };
    let parsed: f64 = value.trim().parse().map_err(|e| invalid(Some(e)))?;
    if !parsed.is_finite() {
        return Err(invalid(None));
    }
    Ok(parsed)
}
