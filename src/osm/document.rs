//! Shaped output documents
//!
//! A [`ShapedDocument`] has a fixed set of structural fields plus two
//! open-ended string maps: the free-form top-level tags and the `address`
//! sub-object. Both maps keep first-insertion order and let a later write to
//! the same key replace the value in place.
//!
//! Serialized field order is `type`, `id`, `visible`, `pos`, `created`, the
//! free-form tags, `address`, `node_refs`.

use super::element::ElementKind;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Top-level names a free-form tag may not take over
pub const RESERVED_FIELDS: &[&str] = &[
    "type",
    "id",
    "visible",
    "pos",
    "created",
    "address",
    "node_refs",
];

/// Insertion-ordered string map; a repeated key replaces its value in place
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMap {
    entries: Vec<(String, String)>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TagMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for TagMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Provenance sub-object; always present, possibly empty
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Created {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changeset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Created {
    /// Build from an attribute lookup, copying each provenance field present
    pub fn from_attributes<'a, F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let copy = |name: &str| lookup(name).map(str::to_owned);
        Created {
            version: copy("version"),
            changeset: copy("changeset"),
            timestamp: copy("timestamp"),
            uid: copy("uid"),
            user: copy("user"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.version.is_none()
            && self.changeset.is_none()
            && self.timestamp.is_none()
            && self.uid.is_none()
            && self.user.is_none()
    }
}

/// One shaped `node` or `way`
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedDocument {
    pub kind: ElementKind,
    /// Kept as a string so 64-bit identifiers survive any JSON consumer
    pub id: String,
    pub visible: Option<String>,
    /// `[latitude, longitude]`
    pub pos: Option<[f64; 2]>,
    pub created: Created,
    /// Free-form top-level tags
    pub tags: TagMap,
    /// Present only when non-empty
    pub address: Option<TagMap>,
    /// Present only when non-empty
    pub node_refs: Option<Vec<String>>,
}

impl ShapedDocument {
    pub fn new(kind: ElementKind, id: impl Into<String>) -> Self {
        ShapedDocument {
            kind,
            id: id.into(),
            visible: None,
            pos: None,
            created: Created::default(),
            tags: TagMap::new(),
            address: None,
            node_refs: None,
        }
    }

    pub fn is_reserved(key: &str) -> bool {
        RESERVED_FIELDS.contains(&key)
    }

    /// Address component by name
    pub fn address_field(&self, component: &str) -> Option<&str> {
        self.address.as_ref().and_then(|a| a.get(component))
    }
}

impl Serialize for ShapedDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind.as_str())?;
        map.serialize_entry("id", &self.id)?;
        if let Some(visible) = &self.visible {
            map.serialize_entry("visible", visible)?;
        }
        if let Some(pos) = &self.pos {
            map.serialize_entry("pos", pos)?;
        }
        map.serialize_entry("created", &self.created)?;
        for (k, v) in self.tags.iter() {
            map.serialize_entry(k, v)?;
        }
        if let Some(address) = &self.address {
            map.serialize_entry("address", address)?;
        }
        if let Some(node_refs) = &self.node_refs {
            map.serialize_entry("node_refs", node_refs)?;
        }
        map.end()
    }
}
