//! Raw map elements as read from the markup
//!
//! A [`RawElement`] is one `node`/`way` start tag with everything nested in
//! it that the shaper cares about: its descriptive `tag` children and, for
//! ways, the `nd` references. Nothing else of the subtree is kept.

use crate::reader::StartElement;
use std::collections::HashMap;

/// Kind of element that produces a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Node,
    Way,
}

impl ElementKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "node" => Some(ElementKind::Node),
            "way" => Some(ElementKind::Way),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Node => "node",
            ElementKind::Way => "way",
        }
    }
}

/// One descriptive key/value child
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Tag {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A markup element with its attributes and collected children
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawElement {
    pub name: String,
    pub attributes: HashMap<String, String>,
    /// Descriptive tags in source order
    pub tags: Vec<Tag>,
    /// Referenced node identifiers in source order
    pub node_refs: Vec<String>,
}

impl RawElement {
    pub fn new(name: impl Into<String>) -> Self {
        RawElement {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn kind(&self) -> Option<ElementKind> {
        ElementKind::from_name(&self.name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    pub fn with_node_ref(mut self, node_ref: impl Into<String>) -> Self {
        self.node_refs.push(node_ref.into());
        self
    }
}

impl From<StartElement> for RawElement {
    fn from(start: StartElement) -> Self {
        RawElement {
            name: start.name,
            attributes: start
                .attributes
                .into_iter()
                .map(|a| (a.name, a.value))
                .collect(),
            tags: Vec::new(),
            node_refs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Attribute;

    #[test]
    fn test_kind() {
        assert_eq!(ElementKind::from_name("node"), Some(ElementKind::Node));
        assert_eq!(ElementKind::from_name("way"), Some(ElementKind::Way));
        assert_eq!(ElementKind::from_name("relation"), None);
        assert_eq!(RawElement::new("bounds").kind(), None);
    }

    #[test]
    fn test_from_start_element() {
        let start = StartElement::new(
            "node",
            vec![Attribute::new("id", "42"), Attribute::new("user", "alice")],
        );
        let raw = RawElement::from(start);
        assert_eq!(raw.kind(), Some(ElementKind::Node));
        assert_eq!(raw.attribute("id"), Some("42"));
        assert_eq!(raw.attribute("user"), Some("alice"));
        assert!(raw.tags.is_empty());
    }

    #[test]
    fn test_builders_keep_order() {
        let raw = RawElement::new("way")
            .with_node_ref("10")
            .with_node_ref("11")
            .with_tag("highway", "residential")
            .with_tag("name", "Cole Rd");
        assert_eq!(raw.node_refs, vec!["10", "11"]);
        assert_eq!(raw.tags[1], Tag::new("name", "Cole Rd"));
    }
}
