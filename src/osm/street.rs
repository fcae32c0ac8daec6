//! Street-name normalization
//!
//! Abbreviated street-type suffixes and directionals are expanded token by
//! token against a fixed, case- and punctuation-sensitive table. The
//! normalizer is a pure function of its input and its tables.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Abbreviation → expansion
pub const STREET_ABBREVIATIONS: &[(&str, &str)] = &[
    ("St", "Street"),
    ("St.", "Street"),
    ("Ave", "Avenue"),
    ("Rd.", "Road"),
    ("Rd", "Road"),
    ("Ln", "Lane"),
    ("W.", "West"),
    ("W", "West"),
    ("N.", "North"),
    ("N", "North"),
    ("S.", "South"),
    ("S", "South"),
    ("E", "East"),
    ("E.", "East"),
    ("Ct", "Center"),
    ("Ct.", "Center"),
    ("Dr", "Drive"),
    ("Dr.", "Drive"),
    ("Cir", "Circle"),
    ("Cir.", "Circle"),
    ("Rte", "Route"),
    ("Rte.", "Route"),
    ("Blvd", "Boulevard"),
    ("Blvd.", "Boulevard"),
    ("Pkwy", "Parkway"),
    ("Ste", "Suite"),
];

/// Street types that are already spelled out
pub const EXPECTED_STREET_TYPES: &[&str] = &[
    "Street", "Avenue", "Boulevard", "Drive", "Court", "Place", "Square", "Lane", "Road", "Trail",
    "Parkway", "Commons",
];

/// Expands abbreviated tokens in street addresses
#[derive(Debug, Clone)]
pub struct StreetNameNormalizer {
    abbreviations: HashMap<String, String>,
    expected: HashSet<String>,
}

impl StreetNameNormalizer {
    pub fn new<A, E>(abbreviations: A, expected: E) -> Self
    where
        A: IntoIterator<Item = (String, String)>,
        E: IntoIterator<Item = String>,
    {
        StreetNameNormalizer {
            abbreviations: abbreviations.into_iter().collect(),
            expected: expected.into_iter().collect(),
        }
    }

    /// Trailing whitespace-delimited token of a street address
    ///
    /// `None` for an empty value or one that ends in whitespace.
    pub fn street_type(value: &str) -> Option<&str> {
        value
            .rsplit(char::is_whitespace)
            .next()
            .filter(|token| !token.is_empty())
    }

    pub fn is_expected(&self, street_type: &str) -> bool {
        self.expected.contains(street_type)
    }

    /// Trailing street type of `value` when it is not already spelled out
    pub fn unexpected_street_type<'a>(&self, value: &'a str) -> Option<&'a str> {
        Self::street_type(value).filter(|street_type| !self.is_expected(street_type))
    }

    /// Replace every space-separated token found in the abbreviation table
    pub fn expand(&self, value: &str) -> String {
        value
            .split(' ')
            .map(|token| {
                self.abbreviations
                    .get(token)
                    .map(String::as_str)
                    .unwrap_or(token)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Expand `value` unless its street type is already spelled out
    pub fn normalize<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self.unexpected_street_type(value) {
            Some(_) => Cow::Owned(self.expand(value)),
            None => Cow::Borrowed(value),
        }
    }
}

impl Default for StreetNameNormalizer {
    fn default() -> Self {
        Self::new(
            STREET_ABBREVIATIONS
                .iter()
                .map(|&(abbr, full)| (abbr.to_owned(), full.to_owned())),
            EXPECTED_STREET_TYPES.iter().map(|&s| s.to_owned()),
        )
    }
}
