//! XML Entity Decoding
//!
//! Handles decoding of XML entities:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//!
//! Uses Cow for zero-copy when nothing needs rewriting. A bare `&`, an
//! undefined entity or a bad character reference is an error: there is no
//! DTD to define anything beyond the built-ins.

use memchr::{memchr, memchr3};
use std::borrow::Cow;

type DecodeResult<'a> = Result<Cow<'a, [u8]>, &'static str>;

/// Decode text content, handling entity references
#[inline]
pub fn decode_text(input: &[u8]) -> DecodeResult<'_> {
    if memchr(b'&', input).is_none() {
        return Ok(Cow::Borrowed(input));
    }
    decode(input, false).map(Cow::Owned)
}

/// Decode an attribute value
///
/// Literal tab, newline and carriage return are normalized to a space before
/// references are expanded, so `&#10;` still yields a newline.
#[inline]
pub fn decode_attribute(input: &[u8]) -> DecodeResult<'_> {
    let needs_work = memchr(b'&', input).is_some() || memchr3(b'\t', b'\n', b'\r', input).is_some();
    if !needs_work {
        return Ok(Cow::Borrowed(input));
    }
    decode(input, true).map(Cow::Owned)
}

fn decode(input: &[u8], normalize_whitespace: bool) -> Result<Vec<u8>, &'static str> {
    let mut result = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        let b = input[pos];
        if b == b'&' {
            let semi_offset = memchr(b';', &input[pos..]).ok_or("'&' does not start a reference")?;
            let decoded = decode_entity(&input[pos + 1..pos + semi_offset])?;
            let mut utf8 = [0u8; 4];
            result.extend_from_slice(decoded.encode_utf8(&mut utf8).as_bytes());
            pos += semi_offset + 1;
            continue;
        }

        if normalize_whitespace && matches!(b, b'\t' | b'\n' | b'\r') {
            result.push(b' ');
        } else {
            result.push(b);
        }
        pos += 1;
    }

    Ok(result)
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &[u8]) -> Result<char, &'static str> {
    match entity {
        [b'#', rest @ ..] => decode_numeric_entity(rest),
        b"lt" => Ok('<'),
        b"gt" => Ok('>'),
        b"amp" => Ok('&'),
        b"quot" => Ok('"'),
        b"apos" => Ok('\''),
        _ => Err("undefined entity reference"),
    }
}

/// Decode a numeric character reference
fn decode_numeric_entity(entity: &[u8]) -> Result<char, &'static str> {
    const INVALID: &str = "invalid character reference";

    let (digits, radix) = match entity {
        [b'x', hex @ ..] => (hex, 16),
        dec => (dec, 10),
    };
    let all_digits = match radix {
        16 => digits.iter().all(u8::is_ascii_hexdigit),
        _ => digits.iter().all(u8::is_ascii_digit),
    };
    if digits.is_empty() || !all_digits {
        return Err(INVALID);
    }

    // Digits are ASCII, so the slice is valid UTF-8
    let text = std::str::from_utf8(digits).map_err(|_| INVALID)?;
    let codepoint = u32::from_str_radix(text, radix).map_err(|_| INVALID)?;

    if !is_valid_xml_char(codepoint) {
        return Err(INVALID);
    }
    char::from_u32(codepoint).ok_or(INVALID)
}

/// Check if a code point is a valid XML 1.0 Char
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}
