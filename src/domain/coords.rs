//! Coordinate validity policy
//!
//! The single authority for deciding whether a (lat, lng) pair is usable.
//! Every cache write and every result surfaced to a caller goes through
//! [`is_usable_job_coords`]; providers occasionally return (0,0) or
//! out-of-region coordinates for unmatched queries and those must never
//! be cached or displayed.

/// Inclusive bounding box covering Israel.
pub const MIN_LAT: f64 = 29.0;
pub const MAX_LAT: f64 = 34.9;
pub const MIN_LNG: f64 = 34.0;
pub const MAX_LNG: f64 = 35.9;

/// Parses a coordinate from a loosely-typed value.
///
/// Accepts anything already convertible to `f64` via [`CoordValue`], which
/// covers numbers and numeric strings. Returns `None` for empty strings and
/// non-finite results. Never panics.
pub fn parse_coord<V: CoordValue>(value: V) -> Option<f64> {
    value.to_coord().filter(|v| v.is_finite())
}

/// Loosely-typed coordinate input, mirroring the numeric-or-string values
/// that arrive from providers and stored job rows.
pub trait CoordValue {
    fn to_coord(self) -> Option<f64>;
}

impl CoordValue for f64 {
    fn to_coord(self) -> Option<f64> {
        Some(self)
    }
}

impl CoordValue for Option<f64> {
    fn to_coord(self) -> Option<f64> {
        self
    }
}

impl CoordValue for &str {
    fn to_coord(self) -> Option<f64> {
        let trimmed = self.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok()
    }
}

impl CoordValue for &String {
    fn to_coord(self) -> Option<f64> {
        self.as_str().to_coord()
    }
}

/// True only if both values parse to exactly zero.
pub fn is_zero_zero(lat: f64, lng: f64) -> bool {
    lat == 0.0 && lng == 0.0
}

/// Inclusive bounding-box test against the Israel box.
pub fn is_in_israel_bounds(lat: f64, lng: f64) -> bool {
    (MIN_LAT..=MAX_LAT).contains(&lat) && (MIN_LNG..=MAX_LNG).contains(&lng)
}

/// True iff both values parse as finite numbers, the pair is not (0,0),
/// and it falls within the Israel bounding box.
pub fn is_usable_job_coords<V: CoordValue, W: CoordValue>(lat: V, lng: W) -> bool {
    match (parse_coord(lat), parse_coord(lng)) {
        (Some(lat), Some(lng)) => !is_zero_zero(lat, lng) && is_in_israel_bounds(lat, lng),
        _ => false,
    }
}

/// Trims and collapses internal whitespace. Returns "" for whitespace-only
/// input. Idempotent.
pub fn normalize_address_text(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Form-level gate for address acceptance, separate from geocoding: the
/// normalized text must have at least two comma-separated segments, the
/// first containing a digit (street number) and the remainder (city)
/// non-empty.
pub fn is_strict_israeli_address_format(value: &str) -> bool {
    let normalized = normalize_address_text(value);
    let Some((street, rest)) = normalized.split_once(',') else {
        return false;
    };
    street.chars().any(|c| c.is_ascii_digit()) && !rest.trim().is_empty()
}
