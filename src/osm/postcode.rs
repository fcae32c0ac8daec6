//! Postal-code normalization
//!
//! Reduces a raw `addr:postcode` value to a bare 5-character code:
//!
//! - ZIP+4 (`95004-9610`) keeps the first five characters.
//! - A value containing a lowercase ASCII letter is taken to be a whole
//!   address typed into the postcode field (`411 Cole Rd, Aromas, CA 95004`)
//!   and keeps its last five characters.
//! - Anything else is returned unchanged.
//!
//! The lowercase-letter test is a heuristic for "this is a full address",
//! not a validation. A value such as `ab` or `Suite 5b` is trimmed all the
//! same, and a value shorter than five characters is returned whole.

use std::borrow::Cow;

const CODE_LEN: usize = 5;

/// Normalize a raw postal code
pub fn normalize(raw: &str) -> Cow<'_, str> {
    if raw.contains('-') {
        Cow::Borrowed(first_chars(raw, CODE_LEN))
    } else if raw.bytes().any(|b| b.is_ascii_lowercase()) {
        Cow::Borrowed(last_chars(raw, CODE_LEN))
    } else {
        Cow::Borrowed(raw)
    }
}

fn first_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn last_chars(s: &str, n: usize) -> &str {
    match n.checked_sub(1).and_then(|skip| s.char_indices().rev().nth(skip)) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}
