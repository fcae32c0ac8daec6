//! Forward-only Pull Reader
//!
//! Stateful reader that pulls events out of any `Read` source in a single
//! pass with bounded memory: only the token being parsed plus one read chunk
//! are held at a time. The buffer grows only when a single token is larger
//! than it.
//!
//! Well-formedness is enforced as the stream goes by. Mismatched or stray
//! end tags, unclosed elements, a missing or repeated root element, bad
//! attributes and truncated markup all surface as
//! [`ConvertError::Malformed`] carrying the byte offset of the offending
//! construct.

use super::buffered::{BufferedReader, DEFAULT_BUFFER_SIZE};
use super::events::{StartElement, XmlEvent};
use crate::core::attributes::{parse_attributes, Attribute};
use crate::core::entities::decode_text;
use crate::core::scanner::{is_whitespace, Scanner};
use crate::error::{ConvertError, Result};
use std::io::Read;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A complete markup construct, detached from the buffer
enum Markup {
    Start {
        name: String,
        attributes: Vec<Attribute>,
        empty: bool,
    },
    End {
        name: String,
    },
    CData(String),
    /// Comment, processing instruction, XML or DOCTYPE declaration
    Skip,
}

enum Step {
    Event(XmlEvent),
    Continue,
}

/// Single-pass event reader over a byte stream
pub struct PullReader<R: Read> {
    input: BufferedReader<R>,
    /// Names of the currently open elements, outermost first
    open: Vec<String>,
    seen_root: bool,
    bom_checked: bool,
    done: bool,
}

impl<R: Read> PullReader<R> {
    pub fn new(source: R) -> Self {
        Self::with_capacity(source, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(source: R, capacity: usize) -> Self {
        PullReader {
            input: BufferedReader::with_capacity(source, capacity),
            open: Vec::new(),
            seen_root: false,
            bom_checked: false,
            done: false,
        }
    }

    /// Number of currently open elements
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Byte offset of the next unread byte
    pub fn position(&self) -> u64 {
        self.input.offset()
    }

    /// Get the next event, or `None` once the document is complete
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        if self.done {
            return Ok(None);
        }
        if !self.bom_checked {
            self.skip_bom()?;
        }

        loop {
            if self.input.buffered().is_empty() && !self.input.fill_buffer()? {
                return self.finish();
            }

            let step = if self.input.buffered()[0] == b'<' {
                self.read_markup()?
            } else {
                self.read_text()?
            };

            if let Step::Event(event) = step {
                return Ok(Some(event));
            }
        }
    }

    fn skip_bom(&mut self) -> Result<()> {
        while self.input.buffered().len() < UTF8_BOM.len() && self.input.fill_buffer()? {}
        if self.input.buffered().starts_with(UTF8_BOM) {
            self.input.consume(UTF8_BOM.len());
        }
        self.bom_checked = true;
        Ok(())
    }

    fn read_markup(&mut self) -> Result<Step> {
        loop {
            let offset = self.input.offset();
            let data = self.input.buffered();

            match markup_len(data) {
                Some(len) => {
                    let markup =
                        tokenize_markup(&data[..len]).map_err(|msg| ConvertError::malformed(msg, offset))?;
                    self.input.consume(len);
                    return self.apply(markup, offset);
                }
                None => {
                    if !self.input.fill_buffer()? {
                        return Err(ConvertError::malformed(
                            "unexpected end of input inside markup",
                            offset,
                        ));
                    }
                }
            }
        }
    }

    fn read_text(&mut self) -> Result<Step> {
        loop {
            let offset = self.input.offset();
            let data = self.input.buffered();

            let len = match Scanner::new(data).find_tag_start() {
                Some(len) => len,
                None if self.input.source_exhausted() => data.len(),
                None => {
                    // Text may continue past the buffered bytes
                    self.input.fill_buffer()?;
                    continue;
                }
            };

            let raw = &data[..len];
            if raw.iter().all(|&b| is_whitespace(b)) {
                self.input.consume(len);
                return Ok(Step::Continue);
            }

            if self.open.is_empty() {
                let msg = if self.seen_root {
                    "junk after document element"
                } else {
                    "text before the root element"
                };
                return Err(ConvertError::malformed(msg, offset));
            }

            let decoded = decode_text(raw).map_err(|msg| ConvertError::malformed(msg, offset))?;
            let text = String::from_utf8(decoded.into_owned())
                .map_err(|_| ConvertError::malformed("text is not valid UTF-8", offset))?;
            self.input.consume(len);
            return Ok(Step::Event(XmlEvent::Text(text)));
        }
    }

    fn apply(&mut self, markup: Markup, offset: u64) -> Result<Step> {
        match markup {
            Markup::Start {
                name,
                attributes,
                empty,
            } => {
                if self.open.is_empty() {
                    if self.seen_root {
                        return Err(ConvertError::malformed("junk after document element", offset));
                    }
                    self.seen_root = true;
                }
                let start = StartElement::new(name, attributes);
                if empty {
                    Ok(Step::Event(XmlEvent::EmptyElement(start)))
                } else {
                    self.open.push(start.name.clone());
                    Ok(Step::Event(XmlEvent::StartElement(start)))
                }
            }
            Markup::End { name } => match self.open.pop() {
                Some(expected) if expected == name => Ok(Step::Event(XmlEvent::EndElement { name })),
                Some(expected) => Err(ConvertError::malformed(
                    format!("mismatched end tag: expected </{expected}>, found </{name}>"),
                    offset,
                )),
                None => Err(ConvertError::malformed(
                    format!("unexpected end tag </{name}>"),
                    offset,
                )),
            },
            Markup::CData(text) => {
                if self.open.is_empty() {
                    return Err(ConvertError::malformed("CDATA outside the root element", offset));
                }
                Ok(Step::Event(XmlEvent::Text(text)))
            }
            Markup::Skip => Ok(Step::Continue),
        }
    }

    fn finish(&mut self) -> Result<Option<XmlEvent>> {
        self.done = true;
        let position = self.input.offset();
        if let Some(name) = self.open.last() {
            return Err(ConvertError::malformed(format!("unclosed element <{name}>"), position));
        }
        if !self.seen_root {
            return Err(ConvertError::malformed("no root element found", position));
        }
        Ok(None)
    }
}

impl<R: Read> Iterator for PullReader<R> {
    type Item = Result<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

/// Length of the markup construct at the start of `data`, or `None` if the
/// buffered bytes end before it does
fn markup_len(data: &[u8]) -> Option<usize> {
    let mut scanner = Scanner::new(data);
    scanner.advance(1); // Skip '<'

    if scanner.starts_with(b"!--") {
        scanner.advance(3);
        scanner.find_sequence(b"-->").map(|i| i + 3)
    } else if scanner.starts_with(b"![CDATA[") {
        scanner.advance(8);
        scanner.find_sequence(b"]]>").map(|i| i + 3)
    } else if scanner.starts_with(b"?") {
        scanner.advance(1);
        scanner.find_sequence(b"?>").map(|i| i + 2)
    } else if scanner.starts_with(b"!") {
        // "<!-" or "<![CDA" may still grow into a comment or CDATA section
        if b"<!--".starts_with(data) || b"<![CDATA[".starts_with(data) {
            return None;
        }
        scanner.find_declaration_end().map(|i| i + 1)
    } else {
        scanner.find_tag_end_quoted().map(|i| i + 1)
    }
}

/// Turn one complete markup construct into an owned token
fn tokenize_markup(markup: &[u8]) -> std::result::Result<Markup, &'static str> {
    if markup.starts_with(b"<![CDATA[") {
        let content = &markup[9..markup.len() - 3];
        let text = String::from_utf8(content.to_vec()).map_err(|_| "CDATA is not valid UTF-8")?;
        return Ok(Markup::CData(text));
    }
    if markup.starts_with(b"<!") || markup.starts_with(b"<?") {
        return Ok(Markup::Skip);
    }

    let mut scanner = Scanner::new(markup);

    if markup.starts_with(b"</") {
        scanner.advance(2);
        let name = scanner.read_name().ok_or("invalid element name in end tag")?;
        scanner.skip_whitespace();
        if scanner.position() != markup.len() - 1 {
            return Err("end tag cannot have attributes");
        }
        return Ok(Markup::End {
            name: name_to_string(name)?,
        });
    }

    scanner.advance(1);
    let name = scanner.read_name().ok_or("invalid element name")?;
    let empty = markup.ends_with(b"/>");
    let attr_end = markup.len() - if empty { 2 } else { 1 };
    let attributes = parse_attributes(&markup[scanner.position()..attr_end])?;

    Ok(Markup::Start {
        name: name_to_string(name)?,
        attributes,
        empty,
    })
}

fn name_to_string(name: &[u8]) -> std::result::Result<String, &'static str> {
    std::str::from_utf8(name)
        .map(str::to_owned)
        .map_err(|_| "element name is not valid UTF-8")
}
