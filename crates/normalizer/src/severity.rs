//! Keyword-based severity classification.

use common::Severity;
use regex::Regex;
use std::sync::LazyLock;

/// Closure and out-of-service language.
static CRITICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(CLSD|CLOSED|OUT\s+OF\s+(SERVICE|SVC)|UNSERVICEABLE|U/S|OTS)\b").unwrap()
});

/// Obstructions and active work areas.
static HIGH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(OBST\w*|CRANE|WIP|WORK\s+IN\s+PROGRESS|CONSTRUCTION)\b").unwrap()
});

/// Lighting, marking, and wildlife advisories.
static MEDIUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(LGTD?S?|LIGHTS?|LIGHTING|MARKINGS?|BIRDS?|WILDLIFE)\b").unwrap()
});

/// Classify canonical text into a severity tier.
///
/// Checks run in fixed priority order and the first matching tier wins, so
/// text carrying both closure and obstruction language classifies Critical.
/// Keywords match at word boundaries only; "FLIGHT" is not lighting.
/// Deterministic, pure, total.
pub fn classify(canonical: &str) -> Severity {
    if CRITICAL.is_match(canonical) {
        Severity::Critical
    } else if HIGH.is_match(canonical) {
        Severity::High
    } else if MEDIUM.is_match(canonical) {
        Severity::Medium
    } else {
        Severity::Info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_is_critical() {
        assert_eq!(classify("KMGM RWY 10/28 CLSD"), Severity::Critical);
        assert_eq!(classify("ils rwy 10 out of service"), Severity::Critical);
    }

    #[test]
    fn obstruction_is_high() {
        assert_eq!(classify("KMGM OBST CRANE 150FT AGL 1NM E OF RWY 10"), Severity::High);
        assert_eq!(classify("KMGM OBSTRUCTION LIGHT TOWER 2NM W"), Severity::High);
    }

    #[test]
    fn lighting_and_wildlife_are_medium() {
        assert_eq!(classify("KMGM TWY A LGT U/S EAST SIDE"), Severity::Critical); // U/S outranks LGT
        assert_eq!(classify("KMGM TWY A EDGE LGT OBSCURED"), Severity::Medium);
        assert_eq!(classify("KMGM BIRD ACTIVITY VICINITY ARPT"), Severity::Medium);
    }

    #[test]
    fn ordered_checks_break_ties() {
        // Both closure and work-in-progress language: closure wins.
        assert_eq!(classify("KMGM TWY B CLSD DUE WIP"), Severity::Critical);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        // FLIGHT must not read as LIGHT, SLOTS must not read as OTS.
        assert_eq!(classify("KMGM FLIGHT CHECK SCHEDULED"), Severity::Info);
        assert_eq!(classify("KMGM ARRIVAL SLOTS LIMITED"), Severity::Info);
    }

    #[test]
    fn everything_else_is_info() {
        assert_eq!(classify("KMGM PPR FOR TRANSIENT ACFT"), Severity::Info);
        assert_eq!(classify(""), Severity::Info);
    }
}
