//! Property-based tests for key classification and value normalization

use osm_shape::osm::keys::{classify, find_problem_char, KeyClass};
use osm_shape::osm::postcode;
use osm_shape::osm::StreetNameNormalizer;
use proptest::prelude::*;

/// Keys built only from the forbidden set plus ordinary characters
fn problem_key_strategy() -> impl Strategy<Value = String> {
    ("[a-zA-Z0-9:_]{0,8}", "[=+/&<>;'\"?%#$@,. \t\r\n]", "[a-zA-Z0-9:_]{0,8}")
        .prop_map(|(head, bad, tail)| format!("{head}{bad}{tail}"))
}

/// Street-like values with an optional abbreviated suffix
fn street_strategy() -> impl Strategy<Value = String> {
    (
        "[0-9]{1,4}",
        "[A-Z][a-z]{2,8}( [A-Z][a-z]{2,8})?",
        prop_oneof![
            Just("St"),
            Just("St."),
            Just("Rd"),
            Just("Ave"),
            Just("Blvd."),
            Just("Street"),
            Just("Real"),
            Just("Dr"),
        ],
    )
        .prop_map(|(number, name, suffix)| format!("{number} {name} {suffix}"))
}

proptest! {
    #[test]
    fn test_lower_keys(key in "[a-z_]{0,16}") {
        prop_assert_eq!(classify(&key), KeyClass::Lower);
    }

    #[test]
    fn test_single_colon_keys(
        left in "[a-z_]{0,8}",
        right in "[a-z_]{0,8}",
    ) {
        prop_assert_eq!(classify(&format!("{left}:{right}")), KeyClass::LowerColon);
    }

    #[test]
    fn test_problem_keys(key in problem_key_strategy()) {
        prop_assert_eq!(classify(&key), KeyClass::ProblemChars);
        prop_assert!(find_problem_char(&key).is_some());
    }

    #[test]
    fn test_any_key_classifies(key in "\\PC{0,12}") {
        let class = classify(&key);
        prop_assert!(KeyClass::ALL.contains(&class));
    }

    #[test]
    fn test_street_normalization_idempotent(value in street_strategy()) {
        let normalizer = StreetNameNormalizer::default();
        let once = normalizer.normalize(&value).into_owned();
        prop_assert_eq!(normalizer.normalize(&once).into_owned(), once);
    }

    #[test]
    fn test_postcode_normalization_idempotent(value in "[0-9A-Za-z ,-]{0,24}") {
        let once = postcode::normalize(&value).into_owned();
        prop_assert_eq!(postcode::normalize(&once).into_owned(), once);
    }

    #[test]
    fn test_zip_plus_four_keeps_first_five(zip in "[0-9]{5}", plus in "[0-9]{4}") {
        let raw = format!("{zip}-{plus}");
        prop_assert_eq!(postcode::normalize(&raw), zip.as_str());
    }
}
