//! Derived navaid availability.
//!
//! Availability is recomputed from scratch over the whole active record set
//! every cycle: a navaid is Unavailable only while some active notice
//! matches its outage pattern, so recovery is automatic when the triggering
//! notice expires or is superseded. No "restored" notice handling exists or
//! is needed.

use chrono::{DateTime, Utc};
use common::{EquipmentStatus, NavaidState, NotamRecord};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info};

/// A navaid with its compiled outage pattern.
#[derive(Debug)]
pub struct NavaidPattern {
    /// Stable navaid identifier exposed over the API.
    pub id: &'static str,
    regex: Regex,
}

impl NavaidPattern {
    /// Panics on an invalid pattern; the table is fixed at compile time.
    fn new(id: &'static str, pattern: &str) -> Self {
        Self {
            id,
            regex: Regex::new(pattern).expect("invalid navaid outage pattern"),
        }
    }

    /// Whether the canonical text reports this navaid out.
    pub fn matches(&self, canonical: &str) -> bool {
        self.regex.is_match(canonical)
    }
}

/// Outage language shared by every pattern.
const OUTAGE: &str = r"(U/S|\bOTS\b|OUT\s+OF\s+(SERVICE|SVC)|UNSERVICEABLE|UNUSBL|UNUSABLE)";

/// Fixed table of watched navaids.
#[derive(Debug)]
pub struct NavaidTable {
    entries: Vec<NavaidPattern>,
}

impl Default for NavaidTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl NavaidTable {
    /// Watched equipment at the airfield: both ILS runway ends and the
    /// TACAN station.
    pub fn builtin() -> Self {
        let entries = vec![
            NavaidPattern::new(
                "ils-rwy-10",
                &format!(r"(?i)\bILS\b[^,;]{{0,40}}?\b(RWY\s*)?10\b.{{0,60}}?{OUTAGE}"),
            ),
            NavaidPattern::new(
                "ils-rwy-28",
                &format!(r"(?i)\bILS\b[^,;]{{0,40}}?\b(RWY\s*)?28\b.{{0,60}}?{OUTAGE}"),
            ),
            NavaidPattern::new(
                "tacan",
                &format!(r"(?i)\bTACAN\b.{{0,60}}?{OUTAGE}"),
            ),
        ];
        Self { entries }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Compute availability from the active record set: all-Available
    /// baseline, any matching record flips that navaid to Unavailable.
    pub fn derive(&self, records: &[NotamRecord]) -> EquipmentStatus {
        let mut status: EquipmentStatus = self
            .entries
            .iter()
            .map(|e| (e.id.to_string(), NavaidState::Available))
            .collect();

        for record in records {
            for entry in &self.entries {
                if entry.matches(&record.canonical_text) {
                    debug!(navaid = entry.id, id = %record.id, "outage match");
                    status.insert(entry.id.to_string(), NavaidState::Unavailable);
                }
            }
        }
        status
    }
}

/// An operator-set state that temporarily shadows derivation.
#[derive(Debug, Clone, Copy)]
struct OverrideEntry {
    state: NavaidState,
    expires_at: DateTime<Utc>,
}

/// Latest derived availability plus operator overrides.
///
/// An override shadows the derived value for a fixed TTL and then lapses
/// back; rederivation never clobbers a live override.
#[derive(Debug, Clone)]
pub struct EquipmentBoard {
    table: Arc<NavaidTable>,
    override_ttl: Duration,
    inner: Arc<RwLock<BoardInner>>,
}

#[derive(Debug)]
struct BoardInner {
    derived: EquipmentStatus,
    overrides: HashMap<String, OverrideEntry>,
}

impl EquipmentBoard {
    pub fn new(table: NavaidTable, override_ttl: Duration) -> Self {
        let derived = table.derive(&[]);
        Self {
            table: Arc::new(table),
            override_ttl,
            inner: Arc::new(RwLock::new(BoardInner {
                derived,
                overrides: HashMap::new(),
            })),
        }
    }

    /// Recompute the derived map from the active set and prune overrides
    /// that have run out their TTL.
    pub fn rederive(&self, records: &[NotamRecord], now: DateTime<Utc>) {
        let derived = self.table.derive(records);
        let mut inner = self.inner.write().expect("board lock poisoned");
        inner.derived = derived;
        inner.overrides.retain(|_, entry| entry.expires_at > now);
    }

    /// Effective status: derived values with live overrides layered on top.
    pub fn status(&self, now: DateTime<Utc>) -> EquipmentStatus {
        let inner = self.inner.read().expect("board lock poisoned");
        let mut status = inner.derived.clone();
        for (id, entry) in &inner.overrides {
            if entry.expires_at > now {
                status.insert(id.clone(), entry.state);
            }
        }
        status
    }

    /// Set an operator override. Returns false for an unknown navaid id.
    pub fn set_override(&self, navaid: &str, state: NavaidState, now: DateTime<Utc>) -> bool {
        if !self.table.contains(navaid) {
            return false;
        }
        let expires_at = now + chrono::Duration::from_std(self.override_ttl).unwrap_or_default();
        info!(%navaid, ?state, %expires_at, "operator override set");
        let mut inner = self.inner.write().expect("board lock poisoned");
        inner.overrides.insert(
            navaid.to_string(),
            OverrideEntry { state, expires_at },
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Severity, Source};

    fn record(canonical: &str) -> NotamRecord {
        let now = Utc::now();
        NotamRecord::new(
            normalizer::surrogate_id("KMGM", canonical),
            "KMGM",
            canonical,
            canonical,
            Severity::Critical,
            Source::Feed,
            now,
            None,
        )
    }

    #[test]
    fn ils_outage_flips_only_that_runway_end() {
        let table = NavaidTable::builtin();
        let status = table.derive(&[record("KMGM ILS RWY 10 U/S")]);
        assert_eq!(status["ils-rwy-10"], NavaidState::Unavailable);
        assert_eq!(status["ils-rwy-28"], NavaidState::Available);
        assert_eq!(status["tacan"], NavaidState::Available);
    }

    #[test]
    fn recovery_is_implicit_on_record_removal() {
        let table = NavaidTable::builtin();
        let outage = record("KMGM ILS RWY 10 OUT OF SERVICE");
        assert_eq!(table.derive(&[outage])["ils-rwy-10"], NavaidState::Unavailable);
        // Same derivation without the record: available again, no
        // "restored" notice involved.
        assert_eq!(table.derive(&[])["ils-rwy-10"], NavaidState::Available);
    }

    #[test]
    fn tacan_outage_language_variants() {
        let table = NavaidTable::builtin();
        for text in [
            "KMGM TACAN U/S",
            "KMGM TACAN OTS WEF 2605121200",
            "KMGM TACAN OUT OF SVC",
            "KMGM TACAN UNSERVICEABLE",
        ] {
            assert_eq!(
                table.derive(&[record(text)])["tacan"],
                NavaidState::Unavailable,
                "should match: {text}"
            );
        }
    }

    #[test]
    fn unrelated_text_leaves_all_available() {
        let table = NavaidTable::builtin();
        let status = table.derive(&[record("KMGM RWY 10/28 CLSD DUE WIP")]);
        assert!(status.values().all(|s| *s == NavaidState::Available));
    }

    #[test]
    fn override_survives_rederive_until_ttl() {
        let board = EquipmentBoard::new(NavaidTable::builtin(), Duration::from_secs(60));
        let now = Utc::now();
        assert!(board.set_override("tacan", NavaidState::Unavailable, now));

        // Rederivation with no outage records does not clobber the override.
        board.rederive(&[], now);
        assert_eq!(board.status(now)["tacan"], NavaidState::Unavailable);

        // Past the TTL the override lapses back to the derived value.
        let later = now + chrono::Duration::seconds(120);
        board.rederive(&[], later);
        assert_eq!(board.status(later)["tacan"], NavaidState::Available);
    }

    #[test]
    fn unknown_navaid_override_is_rejected() {
        let board = EquipmentBoard::new(NavaidTable::builtin(), Duration::from_secs(60));
        assert!(!board.set_override("vor-xyz", NavaidState::Unavailable, Utc::now()));
    }
}
