//! OpenStreetMap element model and shaping rules

pub mod document;
pub mod element;
pub mod keys;
pub mod postcode;
pub mod shaper;
pub mod street;

pub use document::{Created, ShapedDocument, TagMap};
pub use element::{ElementKind, RawElement, Tag};
pub use keys::{classify, KeyClass, KeyClassCounts};
pub use shaper::{AddressOutcome, Diagnostic, ElementShaper, ShapedElement, TagOutcome, TagReport};
pub use street::StreetNameNormalizer;
