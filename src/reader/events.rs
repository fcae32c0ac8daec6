//! Pull Event Types
//!
//! Owned events: every event outlives the buffer chunk it was parsed from,
//! so the reader can keep refilling while consumers hold on to elements.

use crate::core::attributes::Attribute;

/// Markup parsing event
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent {
    /// Start of an element: <name attrs...>
    StartElement(StartElement),
    /// End of an element: </name>
    EndElement { name: String },
    /// Empty element: <name attrs.../>
    EmptyElement(StartElement),
    /// Character data between tags (entities decoded, CDATA included)
    Text(String),
}

/// Start element event data
#[derive(Debug, Clone, PartialEq)]
pub struct StartElement {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl StartElement {
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        StartElement {
            name: name.into(),
            attributes,
        }
    }

    /// Get an attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_lookup() {
        let elem = StartElement::new(
            "tag",
            vec![Attribute::new("k", "amenity"), Attribute::new("v", "cafe")],
        );
        assert_eq!(elem.attribute("k"), Some("amenity"));
        assert_eq!(elem.attribute("v"), Some("cafe"));
        assert_eq!(elem.attribute("ref"), None);
    }
}
