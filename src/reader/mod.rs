//! Markup Reader Module
//!
//! - BufferedReader: growable chunk buffer over any `Read` source
//! - Events: owned pull events
//! - PullReader: forward-only, single-pass event reader

pub mod buffered;
pub mod events;
pub mod pull;

pub use events::{StartElement, XmlEvent};
pub use pull::PullReader;
