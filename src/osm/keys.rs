//! Descriptive-key classification
//!
//! Every `k` attribute seen in the stream falls into exactly one class,
//! tested in this order:
//!
//! 1. `lower`: only lowercase ASCII letters and underscores (empty included)
//! 2. `lower_colon`: two such segments joined by exactly one colon
//! 3. `problemchars`: contains a character that cannot appear in a
//!    document-store field name
//! 4. `other`: everything else (uppercase, digits, extra colons, ...)

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static LOWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_]*$").expect("valid lower pattern"));

static LOWER_COLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_]*:[a-z_]*$").expect("valid lower_colon pattern"));

static PROBLEM_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[=+/&<>;'"?%#$@,. \t\r\n]"#).expect("valid problemchars pattern")
});

/// Syntactic class of a descriptive key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyClass {
    Lower,
    LowerColon,
    #[serde(rename = "problemchars")]
    ProblemChars,
    Other,
}

impl KeyClass {
    pub const ALL: [KeyClass; 4] = [
        KeyClass::Lower,
        KeyClass::LowerColon,
        KeyClass::ProblemChars,
        KeyClass::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            KeyClass::Lower => "lower",
            KeyClass::LowerColon => "lower_colon",
            KeyClass::ProblemChars => "problemchars",
            KeyClass::Other => "other",
        }
    }
}

impl fmt::Display for KeyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a descriptive key
pub fn classify(key: &str) -> KeyClass {
    if LOWER.is_match(key) {
        KeyClass::Lower
    } else if LOWER_COLON.is_match(key) {
        KeyClass::LowerColon
    } else if PROBLEM_CHARS.is_match(key) {
        KeyClass::ProblemChars
    } else {
        KeyClass::Other
    }
}

/// First forbidden character in `key`, if any
///
/// This is the drop filter used while shaping; it runs independently of
/// [`classify`], so a key can be dropped for a problem character whatever
/// class it was counted under.
pub fn find_problem_char(key: &str) -> Option<char> {
    PROBLEM_CHARS
        .find(key)
        .and_then(|m| m.as_str().chars().next())
}

/// Running count of keys per class, accumulated over a whole stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyClassCounts {
    pub lower: u64,
    pub lower_colon: u64,
    pub problemchars: u64,
    pub other: u64,
}

impl KeyClassCounts {
    /// Classify `key` and count it
    pub fn record(&mut self, key: &str) -> KeyClass {
        let class = classify(key);
        *self.slot(class) += 1;
        class
    }

    pub fn get(&self, class: KeyClass) -> u64 {
        match class {
            KeyClass::Lower => self.lower,
            KeyClass::LowerColon => self.lower_colon,
            KeyClass::ProblemChars => self.problemchars,
            KeyClass::Other => self.other,
        }
    }

    pub fn total(&self) -> u64 {
        self.lower + self.lower_colon + self.problemchars + self.other
    }

    fn slot(&mut self, class: KeyClass) -> &mut u64 {
        match class {
            KeyClass::Lower => &mut self.lower,
            KeyClass::LowerColon => &mut self.lower_colon,
            KeyClass::ProblemChars => &mut self.problemchars,
            KeyClass::Other => &mut self.other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower() {
        assert_eq!(classify("amenity"), KeyClass::Lower);
        assert_eq!(classify("opening_hours"), KeyClass::Lower);
        assert_eq!(classify(""), KeyClass::Lower);
    }

    #[test]
    fn test_lower_colon() {
        assert_eq!(classify("addr:street"), KeyClass::LowerColon);
        assert_eq!(classify("tiger:name_base"), KeyClass::LowerColon);
        assert_eq!(classify(":"), KeyClass::LowerColon);
        assert_eq!(classify("addr:"), KeyClass::LowerColon);
    }

    #[test]
    fn test_problemchars() {
        assert_eq!(classify("name.en"), KeyClass::ProblemChars);
        assert_eq!(classify("addr:street name"), KeyClass::ProblemChars);
        assert_eq!(classify("a=b"), KeyClass::ProblemChars);
        assert_eq!(classify("tab\there"), KeyClass::ProblemChars);
    }

    #[test]
    fn test_other() {
        assert_eq!(classify("FIXME"), KeyClass::Other);
        assert_eq!(classify("name_1"), KeyClass::Other);
        assert_eq!(classify("addr:street:name"), KeyClass::Other);
        assert_eq!(classify("name:zh-Hant"), KeyClass::Other);
    }

    #[test]
    fn test_find_problem_char() {
        assert_eq!(find_problem_char("addr:street"), None);
        assert_eq!(find_problem_char("a.b=c"), Some('.'));
        assert_eq!(find_problem_char("two words"), Some(' '));
    }

    #[test]
    fn test_counts() {
        let mut counts = KeyClassCounts::default();
        for key in ["highway", "addr:city", "addr:street:name", "b@d", "name"] {
            counts.record(key);
        }
        assert_eq!(counts.lower, 2);
        assert_eq!(counts.lower_colon, 1);
        assert_eq!(counts.problemchars, 1);
        assert_eq!(counts.other, 1);
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.get(KeyClass::Other), 1);
    }

    #[test]
    fn test_counts_serialize_as_mapping() {
        let mut counts = KeyClassCounts::default();
        counts.record("amenity");
        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"lower": 1, "lower_colon": 0, "problemchars": 0, "other": 0})
        );
    }
}
