//! Source-to-JSON conversion

pub mod report;
pub mod sink;
pub mod streaming;

pub use report::{Conversion, ConversionReport, ElementCounts, StreetAudit};
pub use sink::JsonArrayWriter;
pub use streaming::StreamingConverter;
