//! Ordered parse strategies for the HTML notice listing.
//!
//! Upstream has changed its page markup more than once, so extraction tries
//! progressively looser strategies: semantic `<section>` elements, then
//! elements tagged with a notam-ish class, then raw regex block extraction
//! over the tag-stripped page. The first strategy that yields at least one
//! block wins.

use regex::Regex;
use std::sync::LazyLock;

/// Inner content of semantic section elements.
static SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(?:section|article)\b[^>]*>(.*?)</(?:section|article)>").unwrap());

/// Elements whose class attribute mentions notams.
static NOTAM_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<(?:div|li|td|pre|p)\b[^>]*class\s*=\s*"[^"]*notam[^"]*"[^>]*>(.*?)</(?:div|li|td|pre|p)>"#,
    )
    .unwrap()
});

/// NOTAM-shaped block start in plain text: a US-domestic or ICAO-series
/// identifier header.
static BLOCK_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?[A-Z]{3,4}\s+\d{2}/\d{3}\b|[A-Z]\d{4}/\d{2}\b)").unwrap());

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Extract candidate notice blocks from a listing page.
///
/// Returns the winning strategy's name (for logging) and its blocks, or
/// `None` when every strategy comes up empty.
pub fn extract_blocks(html: &str) -> Option<(&'static str, Vec<String>)> {
    let strategies: [(&'static str, fn(&str) -> Vec<String>); 3] = [
        ("section", sections),
        ("class", class_elements),
        ("regex", regex_blocks),
    ];

    strategies.into_iter().find_map(|(name, strategy)| {
        let blocks = strategy(html);
        if blocks.is_empty() {
            None
        } else {
            Some((name, blocks))
        }
    })
}

fn sections(html: &str) -> Vec<String> {
    SECTION
        .captures_iter(html)
        .map(|caps| strip_tags(&caps[1]))
        .filter(|block| !block.is_empty())
        .collect()
}

fn class_elements(html: &str) -> Vec<String> {
    NOTAM_CLASS
        .captures_iter(html)
        .map(|caps| strip_tags(&caps[1]))
        .filter(|block| !block.is_empty())
        .collect()
}

/// Last resort: strip every tag, then slice the remaining text at each
/// identifier header.
fn regex_blocks(html: &str) -> Vec<String> {
    let text = strip_tags(html);
    let starts: Vec<usize> = BLOCK_START.find_iter(&text).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            text[start..end].trim().to_string()
        })
        .filter(|block| !block.is_empty())
        .collect()
}

/// Replace markup with spaces and decode the handful of entities that show
/// up in the listing.
pub fn strip_tags(html: &str) -> String {
    let text = TAG.replace_all(html, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_semantic_sections() {
        let html = r#"
            <html><body>
            <section>!MGM 05/012 RWY 10/28 CLSD</section>
            <section>!MGM 05/013 TWY A EDGE LGT OBSCURED</section>
            <div class="notamRow">should not be reached</div>
            </body></html>
        "#;
        let (strategy, blocks) = extract_blocks(html).unwrap();
        assert_eq!(strategy, "section");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "!MGM 05/012 RWY 10/28 CLSD");
    }

    #[test]
    fn falls_back_to_class_elements() {
        let html = r#"
            <div class="notamRow"><span>!MGM 05/012</span> RWY 10/28 CLSD</div>
            <div class="notamRow">!MGM 05/014 OBST CRANE 1NM E</div>
        "#;
        let (strategy, blocks) = extract_blocks(html).unwrap();
        assert_eq!(strategy, "class");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "!MGM 05/012 RWY 10/28 CLSD");
    }

    #[test]
    fn regex_strategy_slices_blocks_when_markup_is_useless() {
        let html = "<table><tr><td>!MGM 05/012 RWY 10/28 CLSD</td></tr>\
                    <tr><td>!MGM 05/013 TWY A CLSD</td></tr>\
                    <tr><td>A1234/26 ILS RWY 10 U/S</td></tr></table>";
        let (strategy, blocks) = extract_blocks(html).unwrap();
        assert_eq!(strategy, "regex");
        assert_eq!(blocks.len(), 3);
        assert!(blocks[2].starts_with("A1234/26"));
    }

    #[test]
    fn empty_page_yields_none() {
        assert!(extract_blocks("").is_none());
        assert!(extract_blocks("<html><body>No current notices.</body></html>").is_none());
    }

    #[test]
    fn strip_tags_collapses_and_decodes() {
        assert_eq!(
            strip_tags("<b>RWY&nbsp;10</b> &amp; <i>RWY 28</i>"),
            "RWY 10 & RWY 28"
        );
    }
}
