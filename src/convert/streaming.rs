//! Streaming Converter
//!
//! Single forward pass over the markup: pull events, assemble each
//! `node`/`way`, shape it when it closes, and hand the document on. Only the
//! open elements are held in memory, plus the documents themselves when the
//! caller asks for them.
//!
//! A `node`/`way` nested in another one gets its own document, emitted
//! before its ancestor's. Its `tag` and `nd` children also belong to every
//! enclosing `node`/`way`.

use super::report::{Conversion, ConversionReport};
use super::sink::JsonArrayWriter;
use crate::config::{ConvertOptions, ShapeConfig};
use crate::error::Result;
use crate::osm::{AddressOutcome, ElementKind, ElementShaper, RawElement, ShapedDocument, Tag, TagOutcome};
use crate::reader::{PullReader, StartElement, XmlEvent};
use std::io::{Read, Write};
use tracing::{debug, info, warn};

/// A `node`/`way` whose children are still being read
struct Pending {
    element: RawElement,
    /// Reader depth of the element itself
    depth: usize,
}

/// A descendant that every open `node`/`way` collects
enum Child {
    Tag(Tag),
    NodeRef(String),
}

impl Child {
    /// `owner` is the id of the innermost open element, for the log
    fn from_start(start: &StartElement, owner: &str) -> Option<Child> {
        match start.name.as_str() {
            "tag" => match (start.attribute("k"), start.attribute("v")) {
                (Some(key), Some(value)) => Some(Child::Tag(Tag::new(key, value))),
                _ => {
                    warn!(element = owner, "skipping <tag> without both k and v");
                    None
                }
            },
            "nd" => match start.attribute("ref") {
                Some(node_ref) => Some(Child::NodeRef(node_ref.to_owned())),
                None => {
                    warn!(element = owner, "skipping <nd> without ref");
                    None
                }
            },
            _ => None,
        }
    }

    fn add_to(&self, element: &mut RawElement) {
        match self {
            Child::Tag(tag) => element.tags.push(tag.clone()),
            Child::NodeRef(node_ref) => element.node_refs.push(node_ref.clone()),
        }
    }
}

/// State of one conversion call
#[derive(Default)]
struct Pass {
    report: ConversionReport,
    /// Open `node`/`way` elements, outermost first
    pending: Vec<Pending>,
}

impl Pass {
    /// Count a start tag and route it
    ///
    /// `depth` is `None` for an empty element. Returns a `node`/`way` that
    /// is already complete.
    fn start(&mut self, start: StartElement, depth: Option<usize>) -> Option<RawElement> {
        self.report.element_counts.record(&start.name);
        if start.name == "tag" {
            if let Some(key) = start.attribute("k") {
                self.report.key_counts.record(key);
            }
        }

        if let Some(innermost) = self.pending.last() {
            let owner = innermost.element.attribute("id").unwrap_or("?");
            if let Some(child) = Child::from_start(&start, owner) {
                for pending in &mut self.pending {
                    child.add_to(&mut pending.element);
                }
            }
        }

        ElementKind::from_name(&start.name)?;
        let element = RawElement::from(start);
        match depth {
            Some(depth) => {
                self.pending.push(Pending { element, depth });
                None
            }
            None => Some(element),
        }
    }

    /// Returns the innermost pending element once the reader has left it
    fn end(&mut self, depth: usize) -> Option<RawElement> {
        match self.pending.last() {
            Some(pending) if depth < pending.depth => self.pending.pop().map(|p| p.element),
            _ => None,
        }
    }
}

/// Converts an OSM XML source into shaped documents
#[derive(Debug, Clone)]
pub struct StreamingConverter {
    shaper: ElementShaper,
    options: ConvertOptions,
}

impl StreamingConverter {
    pub fn new(config: &ShapeConfig) -> Self {
        Self::with_options(config, ConvertOptions::default())
    }

    pub fn with_options(config: &ShapeConfig, options: ConvertOptions) -> Self {
        StreamingConverter {
            shaper: ElementShaper::new(config),
            options,
        }
    }

    /// Convert the whole source, keeping every document in memory
    pub fn convert<R: Read>(&self, source: R) -> Result<Conversion> {
        let mut documents = Vec::new();
        let report = self.run(source, |document| {
            documents.push(document);
            Ok(())
        })?;
        Ok(Conversion { documents, report })
    }

    /// Convert the source and write the documents to `sink` as one JSON array
    ///
    /// Unless `buffer_documents` is set, each document is written as soon as
    /// its element closes. Either way the bytes are the same. On error the
    /// sink may hold a partial array.
    pub fn convert_to_writer<R: Read, W: Write>(&self, source: R, mut sink: W) -> Result<ConversionReport> {
        if self.options.buffer_documents {
            let conversion = self.convert(source)?;
            conversion.write_json(&mut sink, self.options.pretty)?;
            sink.flush()?;
            return Ok(conversion.report);
        }

        let mut writer = JsonArrayWriter::new(sink, self.options.pretty)?;
        let report = self.run(source, |document| writer.write(&document))?;
        writer.finish()?;
        Ok(report)
    }

    fn run<R, F>(&self, source: R, mut emit: F) -> Result<ConversionReport>
    where
        R: Read,
        F: FnMut(ShapedDocument) -> Result<()>,
    {
        debug!(
            buffer_size = self.options.buffer_size,
            buffered = self.options.buffer_documents,
            "starting conversion"
        );
        let mut reader = PullReader::with_capacity(source, self.options.buffer_size);
        let mut pass = Pass::default();

        while let Some(event) = reader.next_event()? {
            let complete = match event {
                XmlEvent::StartElement(start) => pass.start(start, Some(reader.depth())),
                XmlEvent::EmptyElement(start) => pass.start(start, None),
                XmlEvent::EndElement { .. } => pass.end(reader.depth()),
                XmlEvent::Text(_) => None,
            };
            if let Some(element) = complete {
                if let Some(document) = self.shape(&element, &mut pass.report)? {
                    emit(document)?;
                }
            }
        }

        let report = pass.report;
        info!(
            documents = report.documents,
            tags = report.key_counts.total(),
            problemchars = report.key_counts.problemchars,
            dropped = report.dropped_tags,
            bytes = reader.position(),
            "conversion finished"
        );
        Ok(report)
    }

    fn shape(&self, element: &RawElement, report: &mut ConversionReport) -> Result<Option<ShapedDocument>> {
        let Some(shaped) = self.shaper.shape(element)? else {
            return Ok(None);
        };

        for tag in &shaped.tags {
            match &tag.outcome {
                TagOutcome::Dropped(diagnostic) => {
                    warn!("dropping tag: {diagnostic}");
                    report.dropped_tags += 1;
                    if self.options.collect_diagnostics {
                        report.diagnostics.push(diagnostic.clone());
                    }
                }
                TagOutcome::Ignored => {
                    debug!(element = %shaped.document.id, key = %tag.key, "ignoring nested address key");
                    report.ignored_tags += 1;
                }
                TagOutcome::Address(AddressOutcome::StreetExpanded { street_type, original }) => {
                    report.street_audit.record(street_type, original);
                }
                _ => {}
            }
        }

        report.documents += 1;
        Ok(Some(shaped.document))
    }
}

impl Default for StreamingConverter {
    fn default() -> Self {
        Self::new(&ShapeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::osm::{Diagnostic, KeyClass};

    fn convert(xml: &str) -> Conversion {
        StreamingConverter::default().convert(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_nodes_and_ways_in_source_order() {
        let conversion = convert(
            r#"<osm>
                 <node id="1"/>
                 <way id="2"><nd ref="1"/></way>
                 <node id="3"></node>
               </osm>"#,
        );
        let ids: Vec<_> = conversion.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(conversion.report.documents, 3);
    }

    #[test]
    fn test_children_collected() {
        let conversion = convert(
            r#"<osm><way id="7">
                 <nd ref="10"/><nd ref="11"/>
                 <tag k="highway" v="residential"/>
                 <tag k="addr:street" v="Cole Rd"/>
               </way></osm>"#,
        );
        let doc = &conversion.documents[0];
        assert_eq!(doc.node_refs, Some(vec!["10".to_owned(), "11".to_owned()]));
        assert_eq!(doc.tags.get("highway"), Some("residential"));
        assert_eq!(doc.address_field("street"), Some("Cole Road"));
        assert!(conversion.report.street_audit.get("Rd").is_some());
    }

    #[test]
    fn test_counts_cover_every_tag() {
        let conversion = convert(
            r#"<osm>
                 <node id="1"><tag k="amenity" v="cafe"/></node>
                 <relation id="9"><tag k="type" v="route"/><tag k="name:en" v="x"/></relation>
               </osm>"#,
        );
        let report = &conversion.report;
        assert_eq!(report.key_counts.get(KeyClass::Lower), 2);
        assert_eq!(report.key_counts.get(KeyClass::LowerColon), 1);
        assert_eq!(report.element_counts.get("tag"), 3);
        assert_eq!(report.element_counts.get("relation"), 1);
        assert_eq!(conversion.documents.len(), 1);
    }

    #[test]
    fn test_bad_children_skipped() {
        let conversion = convert(
            r#"<osm><way id="1"><tag k="name"/><nd/><nd ref="5"/></way></osm>"#,
        );
        let doc = &conversion.documents[0];
        assert!(doc.tags.is_empty());
        assert_eq!(doc.node_refs, Some(vec!["5".to_owned()]));
        // A tag with a key is still counted
        assert_eq!(conversion.report.key_counts.total(), 1);
    }

    #[test]
    fn test_nested_elements_each_shaped() {
        let conversion = convert(
            r#"<osm><way id="1"><node id="2"><tag k="name" v="inner"/><nd ref="9"/></node><tag k="highway" v="path"/></way></osm>"#,
        );
        let ids: Vec<_> = conversion.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);

        let (inner, outer) = (&conversion.documents[0], &conversion.documents[1]);
        assert_eq!(inner.tags.get("name"), Some("inner"));
        assert_eq!(inner.tags.get("highway"), None);
        assert_eq!(outer.tags.get("name"), Some("inner"));
        assert_eq!(outer.tags.get("highway"), Some("path"));
        assert_eq!(outer.node_refs, Some(vec!["9".to_owned()]));
        // Keys are counted once however many elements collect them
        assert_eq!(conversion.report.key_counts.total(), 2);
    }

    #[test]
    fn test_nested_empty_node_shaped() {
        let conversion = convert(r#"<osm><way id="1"><node id="2"/><nd ref="2"/></way></osm>"#);
        let ids: Vec<_> = conversion.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(conversion.report.documents, 2);
    }

    #[test]
    fn test_diagnostics_collected_on_request() {
        let xml = r#"<osm><node id="4"><tag k="a b" v="x"/><tag k="addr:street:name" v="y"/></node></osm>"#;
        let report = convert(xml).report;
        assert_eq!(report.dropped_tags, 1);
        assert_eq!(report.ignored_tags, 1);
        assert!(report.diagnostics.is_empty());

        let options = ConvertOptions {
            collect_diagnostics: true,
            ..ConvertOptions::default()
        };
        let report = StreamingConverter::with_options(&ShapeConfig::default(), options)
            .convert(xml.as_bytes())
            .unwrap()
            .report;
        assert_eq!(report.dropped_tags, 1);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::ProblemChars {
                element_id: "4".into(),
                key: "a b".into(),
                found: ' ',
            }]
        );
    }

    #[test]
    fn test_shaping_error_aborts() {
        let err = StreamingConverter::default()
            .convert(r#"<osm><node id="1" lat="x" lon="2"/></osm>"#.as_bytes())
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_malformed_source_aborts() {
        let err = StreamingConverter::default()
            .convert(r#"<osm><node id="1"></osm>"#.as_bytes())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Malformed { .. }));
    }

    #[test]
    fn test_streamed_and_buffered_output_match() {
        let xml = r#"<osm><node id="1" user="alice"><tag k="name" v="A"/></node><way id="2"><nd ref="1"/></way></osm>"#;
        for pretty in [false, true] {
            let mut outputs = Vec::new();
            for buffer_documents in [false, true] {
                let options = ConvertOptions {
                    pretty,
                    buffer_documents,
                    ..ConvertOptions::default()
                };
                let mut out = Vec::new();
                StreamingConverter::with_options(&ShapeConfig::default(), options)
                    .convert_to_writer(xml.as_bytes(), &mut out)
                    .unwrap();
                outputs.push(out);
            }
            assert_eq!(outputs[0], outputs[1]);
        }
    }
}
