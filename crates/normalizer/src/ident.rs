//! Best-effort NOTAM identifier extraction.
//!
//! Identifier extraction is heuristic: upstream headers are inconsistent and
//! some notices carry no identifier at all. Callers treat the result as a
//! dedup key that can collide or be missing, falling back to [`surrogate_id`].

use regex::Regex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

/// ICAO-series identifier, e.g. `A1234/26`.
static ICAO_SERIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]\d{4}/\d{2})\b").unwrap());

/// US domestic identifier, e.g. `!MGM 05/012`.
static US_DOMESTIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!([A-Z]{3,4})\s+(\d{2}/\d{3})\b").unwrap());

/// Extract a NOTAM identifier from notice text, if one is present.
pub fn extract_id(text: &str) -> Option<String> {
    if let Some(caps) = ICAO_SERIES.captures(text) {
        return Some(caps[1].to_string());
    }
    if let Some(caps) = US_DOMESTIC.captures(text) {
        return Some(format!("{} {}", &caps[1], &caps[2]));
    }
    None
}

/// Synthesize a stable surrogate identifier for a notice without one.
///
/// Hashing the canonical text keeps the surrogate stable across repeated
/// scrapes of the same notice, so re-ingestion dedups instead of piling up.
pub fn surrogate_id(location: &str, canonical_text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    canonical_text.hash(&mut hasher);
    format!("{}-{:016x}", location, hasher.finish())
}
