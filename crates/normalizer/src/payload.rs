//! Feed transport payload extraction.
//!
//! The feed delivers NOTAM bodies in whichever encoding the upstream
//! publisher happened to use: a structured JSON envelope, an XML-tagged
//! body, or bare text. Extraction probes the encodings in a fixed
//! preference order and short-circuits on the first that yields text.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// JSON envelope fields that can carry the notice body, probed in order.
const JSON_TEXT_FIELDS: &[&str] = &["notam_text", "text", "body", "message"];

/// JSON envelope fields that can carry the location code.
const JSON_LOCATION_FIELDS: &[&str] = &["location", "icao", "facility"];

/// Inner text of an XML-tagged notice body.
static XML_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:notam|text|body)\b[^>]*>(.*?)</(?:notam|text|body)>").unwrap()
});

/// XML location tag.
static XML_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<location\b[^>]*>\s*([A-Z]{4})\s*</location>").unwrap());

/// ICAO A) field inside notice text, e.g. `A) KMGM`.
static TEXT_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bA\)\s*([A-Z]{4})\b").unwrap());

/// Leading location code of a plain-text notice, e.g. `KMGM RWY 10 CLSD`.
static LEADING_LOCATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Z]{4})\b").unwrap());

/// A payload successfully pulled out of a transport message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPayload {
    /// Location code embedded in the payload, when one was found.
    pub location: Option<String>,
    /// Operative notice text, still raw (not yet normalized).
    pub text: String,
}

/// Extract a NOTAM payload from raw message bytes.
///
/// Attempts, in order: JSON envelope, XML-tagged body, plain UTF-8 text.
/// Once an encoding is recognized, extraction commits to it: a JSON object
/// without a usable body field is a dropped message, not plain text. Returns
/// `None` when nothing yields usable text; the caller drops the message.
pub fn extract_payload(raw: &[u8]) -> Option<ExtractedPayload> {
    let text = std::str::from_utf8(raw).ok()?;

    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(text) {
        return from_json_envelope(&obj);
    }
    if text.trim_start().starts_with('<') {
        return from_xml(text);
    }
    try_plain(text)
}

fn from_json_envelope(obj: &serde_json::Map<String, Value>) -> Option<ExtractedPayload> {
    let body = JSON_TEXT_FIELDS
        .iter()
        .find_map(|field| obj.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())?;

    let location = JSON_LOCATION_FIELDS
        .iter()
        .find_map(|field| obj.get(*field).and_then(Value::as_str))
        .map(|s| s.trim().to_uppercase())
        .or_else(|| location_from_text(body));

    Some(ExtractedPayload {
        location,
        text: body.to_string(),
    })
}

fn from_xml(text: &str) -> Option<ExtractedPayload> {
    let caps = XML_TEXT.captures(text)?;
    let body = caps[1].trim();
    if body.is_empty() {
        return None;
    }

    let location = XML_LOCATION
        .captures(text)
        .map(|c| c[1].to_string())
        .or_else(|| location_from_text(body));

    Some(ExtractedPayload {
        location,
        text: body.to_string(),
    })
}

fn try_plain(text: &str) -> Option<ExtractedPayload> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(ExtractedPayload {
        location: location_from_text(trimmed),
        text: trimmed.to_string(),
    })
}

/// Pull a location code out of notice text itself: the ICAO `A)` field
/// first, else a leading 4-letter code.
pub fn location_from_text(text: &str) -> Option<String> {
    TEXT_LOCATION
        .captures(text)
        .or_else(|| LEADING_LOCATION.captures(text))
        .map(|c| c[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_envelope_wins_over_other_encodings() {
        let raw = br#"{"location":"KMGM","notam_text":"RWY 10/28 CLSD"}"#;
        let payload = extract_payload(raw).unwrap();
        assert_eq!(payload.location.as_deref(), Some("KMGM"));
        assert_eq!(payload.text, "RWY 10/28 CLSD");
    }

    #[test]
    fn json_without_location_falls_back_to_text_scan() {
        let raw = br#"{"text":"A1234/26 Q) KZTL/QMRLC A) KMGM E) RWY 10 CLSD"}"#;
        let payload = extract_payload(raw).unwrap();
        assert_eq!(payload.location.as_deref(), Some("KMGM"));
    }

    #[test]
    fn xml_body_extraction() {
        let raw = b"<message><location>KMGM</location><notam>RWY 10/28 CLSD</notam></message>";
        let payload = extract_payload(raw).unwrap();
        assert_eq!(payload.location.as_deref(), Some("KMGM"));
        assert_eq!(payload.text, "RWY 10/28 CLSD");
    }

    #[test]
    fn plain_text_fallback() {
        let payload = extract_payload(b"KMGM TWY A CLSD DUE WIP").unwrap();
        assert_eq!(payload.location.as_deref(), Some("KMGM"));
        assert_eq!(payload.text, "KMGM TWY A CLSD DUE WIP");
    }

    #[test]
    fn garbage_yields_none() {
        assert_eq!(extract_payload(b""), None);
        assert_eq!(extract_payload(b"   \n  "), None);
        assert_eq!(extract_payload(&[0xff, 0xfe, 0x00]), None);
    }

    #[test]
    fn unrecognized_markup_is_dropped() {
        assert_eq!(extract_payload(b"<metar>KMGM 121853Z AUTO</metar>"), None);
    }

    #[test]
    fn json_with_empty_body_is_rejected() {
        assert_eq!(extract_payload(br#"{"text":"  "}"#), None);
    }
}
