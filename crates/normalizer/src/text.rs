//! Canonical text normalization for raw NOTAM bodies.

use regex::Regex;
use std::sync::LazyLock;

/// Airport-name boilerplate ending in a parenthesized 4-letter code, e.g.
/// `MONTGOMERY RGNL (DANNELLY FIELD) (KMGM)`. Replaced by the bare code.
static AIRPORT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][A-Z0-9 .'/-]+(?:\([A-Z0-9 .'/-]+\)\s*)?\(([A-Z]{4})\)").unwrap()
});

/// Administrative trailer starting at a CREATED: or SOURCE: tag. Everything
/// from the first tag to the end of the text is metadata, not content.
static ADMIN_TRAILER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\b(?:CREATED|SOURCE):.*$").unwrap());

/// Notice-type markers (NOTAMN / NOTAMR / NOTAMC).
static NOTICE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bNOTAM[NRC]\b").unwrap());

/// First recognizable field marker. The operative clause starts here; any
/// text before it is header noise.
static FIELD_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z]\d{4}/\d{2}\b|!?[A-Z]{3,4}\s+\d{2}/\d{3}\b|\bQ\)|\bA\)|\bE\))").unwrap()
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a raw NOTAM body into canonical text.
///
/// Total: any input yields output, worst case the input with whitespace
/// collapsed. Pure, no side effects.
pub fn normalize(raw: &str) -> String {
    let text = ADMIN_TRAILER.replace(raw, "");
    let text = NOTICE_MARKER.replace_all(&text, "");
    let text = AIRPORT_NAME.replace_all(&text, "$1");

    // Keep everything from the first field marker onward. When no marker is
    // present the whole (cleaned) text is the operative clause.
    let text = match FIELD_MARKER.find(&text) {
        Some(m) => &text[m.start()..],
        None => text.as_ref(),
    };

    WHITESPACE.replace_all(text, " ").trim().to_string()
}
