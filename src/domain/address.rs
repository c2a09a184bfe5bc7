//! Address candidate queries and cache keys
//!
//! Turns a raw address string into an ordered, de-duplicated list of
//! candidate query strings to try against geocoding providers, and computes
//! the stable digest used as the geocode cache key.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use super::coords::normalize_address_text;

/// Trailing sub-unit descriptors (apartment, floor, entrance and so on,
/// plus their Hebrew equivalents) followed by a short token. Geocoding and
/// routing providers generally cannot resolve these, so they are stripped
/// before querying.
static SUBUNIT_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[,\s]+(?:apartment|apt|floor|entrance|suite|unit|דירה|קומה|כניסה|יחידה)\.?\s*[0-9A-Za-z\u{05D0}-\u{05EA}]{1,4}\s*$",
    )
    .expect("sub-unit suffix pattern is valid")
});

static SEPARATOR_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[;,]+\s*").expect("separator pattern is valid"));

/// Stable digest over the lower-cased normalized address text, hex-encoded.
/// Same normalized text always yields the same hash.
pub fn address_hash(normalized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized.to_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}

/// Strips a trailing sub-unit descriptor from an already-normalized address,
/// falling back to the input when stripping would leave nothing.
pub fn strip_subunit_suffix(normalized: &str) -> String {
    let stripped = SUBUNIT_SUFFIX.replace(normalized, "");
    let stripped = stripped.trim().trim_end_matches(',').trim();
    if stripped.is_empty() {
        normalized.to_string()
    } else {
        stripped.to_string()
    }
}

/// Produces the ordered candidate queries for a raw address string,
/// most-specific first.
pub fn candidate_queries(raw: &str) -> Vec<String> {
    let separated = SEPARATOR_RUNS.replace_all(raw, ", ");
    let normalized = normalize_address_text(&separated);
    if normalized.is_empty() {
        return Vec::new();
    }

    let base = strip_subunit_suffix(&normalized);

    let mut candidates = vec![
        base.clone(),
        format!("{base}, ישראל"),
        format!("{base}, Israel"),
    ];
    if base != normalized {
        candidates.push(normalized);
    }

    let mut seen = Vec::new();
    for candidate in candidates {
        if !candidate.is_empty() && !seen.contains(&candidate) {
            seen.push(candidate);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hash_is_stable_and_case_insensitive() {
        let a = address_hash("herzl 10, ashdod");
        let b = address_hash("Herzl 10, Ashdod");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, address_hash("herzl 11, ashdod"));
    }

    #[test]
    fn test_strip_apartment_suffix() {
        assert_eq!(strip_subunit_suffix("הרצל 10, אשדוד דירה 5"), "הרצל 10, אשדוד");
        assert_eq!(strip_subunit_suffix("Herzl 10, Ashdod apt 12"), "Herzl 10, Ashdod");
        assert_eq!(strip_subunit_suffix("Herzl 10, Ashdod floor 3"), "Herzl 10, Ashdod");
        assert_eq!(strip_subunit_suffix("הרצל 10, אשדוד קומה ב"), "הרצל 10, אשדוד");
    }

    #[test]
    fn test_strip_keeps_plain_address() {
        assert_eq!(strip_subunit_suffix("הרצל 10, אשדוד"), "הרצל 10, אשדוד");
    }

    #[test]
    fn test_strip_falls_back_when_everything_is_removed() {
        // A bare descriptor should not strip down to the empty string.
        assert_eq!(strip_subunit_suffix("apartment 5"), "apartment 5");
    }

    #[test]
    fn test_candidates_order_and_dedup() {
        let candidates = candidate_queries("הרצל 10, אשדוד");
        assert_eq!(
            candidates,
            vec![
                "הרצל 10, אשדוד".to_string(),
                "הרצל 10, אשדוד, ישראל".to_string(),
                "הרצל 10, אשדוד, Israel".to_string(),
            ]
        );
    }

    #[test]
    fn test_candidates_include_unstripped_original() {
        let candidates = candidate_queries("הרצל 10, אשדוד דירה 5");
        assert_eq!(candidates[0], "הרצל 10, אשדוד");
        assert!(candidates.contains(&"הרצל 10, אשדוד דירה 5".to_string()));
    }

    #[test]
    fn test_candidates_normalize_separator_runs() {
        let candidates = candidate_queries("הרצל 10;;אשדוד");
        assert_eq!(candidates[0], "הרצל 10, אשדוד");
    }

    #[test]
    fn test_candidates_empty_input() {
        assert!(candidate_queries("").is_empty());
        assert!(candidate_queries("   ").is_empty());
    }
}
