//! XML Attribute Parsing
//!
//! Parses attributes from the content between an element name and its
//! closing `>` or `/>`. Parsing is strict: anything the source parser would
//! reject as ill-formed comes back as an error message.

use super::entities::decode_attribute;
use super::scanner::{is_name_char, is_name_start_char, is_whitespace};
use memchr::memchr;

/// A parsed attribute with its value decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parse attributes from raw tag content (after the element name)
pub fn parse_attributes(input: &[u8]) -> Result<Vec<Attribute>, &'static str> {
    let mut attrs: Vec<Attribute> = Vec::new();
    let mut pos = 0;

    loop {
        let ws_start = pos;
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        if pos >= input.len() {
            break;
        }

        // Attributes must be separated from the element name and from each other
        if pos == ws_start {
            return Err("Attributes must be separated by whitespace");
        }

        let name_start = pos;
        if !is_name_start_char(input[pos]) {
            return Err("Attribute name must start with letter, underscore, or colon");
        }
        while pos < input.len() && is_name_char(input[pos]) {
            pos += 1;
        }
        let name = std::str::from_utf8(&input[name_start..pos])
            .map_err(|_| "Attribute name is not valid UTF-8")?;

        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }
        if input.get(pos) != Some(&b'=') {
            return Err("Attribute value required");
        }
        pos += 1; // Skip '='

        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        let quote = match input.get(pos) {
            Some(&q @ (b'"' | b'\'')) => q,
            _ => return Err("Attribute value must be quoted"),
        };
        pos += 1; // Skip opening quote

        let value_len = memchr(quote, &input[pos..]).ok_or("Attribute value has mismatched quotes")?;
        let raw_value = &input[pos..pos + value_len];
        if memchr(b'<', raw_value).is_some() {
            return Err("Attribute value cannot contain '<'");
        }
        pos += value_len + 1; // Skip value and closing quote

        if attrs.iter().any(|a| a.name == name) {
            return Err("Duplicate attribute");
        }

        let value = String::from_utf8(decode_attribute(raw_value)?.into_owned())
            .map_err(|_| "Attribute value is not valid UTF-8")?;
        attrs.push(Attribute::new(name, value));
    }

    Ok(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_attributes() {
        let attrs = parse_attributes(b" id=\"261114295\" lat=\"37.5\"").unwrap();
        assert_eq!(
            attrs,
            vec![Attribute::new("id", "261114295"), Attribute::new("lat", "37.5")]
        );
    }

    #[test]
    fn test_single_quoted() {
        let attrs = parse_attributes(b" v='Joe\"s'").unwrap();
        assert_eq!(attrs[0].value, "Joe\"s");
    }

    #[test]
    fn test_entity_in_value() {
        let attrs = parse_attributes(b" v=\"Fish &amp; Chips\"").unwrap();
        assert_eq!(attrs[0].value, "Fish & Chips");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_attributes(b"").unwrap().is_empty());
        assert!(parse_attributes(b"   ").unwrap().is_empty());
    }

    #[test]
    fn test_whitespace_around_equals() {
        let attrs = parse_attributes(b"  k  =  \"addr:street\"  ").unwrap();
        assert_eq!(attrs, vec![Attribute::new("k", "addr:street")]);
    }

    #[test]
    fn test_unquoted_rejected() {
        assert_eq!(
            parse_attributes(b" id=1"),
            Err("Attribute value must be quoted")
        );
    }

    #[test]
    fn test_duplicate_rejected() {
        assert_eq!(
            parse_attributes(b" k=\"a\" k=\"b\""),
            Err("Duplicate attribute")
        );
    }

    #[test]
    fn test_missing_separator_rejected() {
        assert!(parse_attributes(b" k=\"a\"v=\"b\"").is_err());
    }

    #[test]
    fn test_bad_reference_in_value_rejected() {
        assert_eq!(
            parse_attributes(b" v=\"A & B\""),
            Err("'&' does not start a reference")
        );
        assert_eq!(
            parse_attributes(b" v=\"A&nbsp;B\""),
            Err("undefined entity reference")
        );
    }

    #[test]
    fn test_lt_in_value_rejected() {
        assert!(parse_attributes(b" v=\"a<b\"").is_err());
    }
}
