//! Canonical NOTAM record schema and derived equipment state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How long a notice without an explicit end time stays active.
///
/// Upstream data is noisy enough that "no end time" usually means the end
/// time was unparseable rather than that the notice is permanent, so an
/// open-ended record is given a fixed horizon instead of living forever.
pub const DEFAULT_VALIDITY_HOURS: i64 = 24;

/// Which upstream produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Pushed over the live pub/sub feed.
    Feed,
    /// Extracted from the periodic HTML scrape.
    Fallback,
}

/// Ordered urgency tier. Lower variants sort first, so sorting a record
/// list ascending puts the most urgent notices at the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Closures and out-of-service equipment.
    Critical,
    /// Obstructions and active work areas.
    High,
    /// Lighting, marking, and wildlife advisories.
    Medium,
    /// Everything else.
    Info,
}

/// One normalized notice in the active set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotamRecord {
    /// Extracted NOTAM identifier, or a synthetic surrogate when the header
    /// carried none. Best-effort dedup key.
    pub id: String,
    /// 4-character location code the notice applies to.
    pub location: String,
    /// Original payload text as received.
    pub raw_text: String,
    /// Normalized form used for classification and matching.
    pub canonical_text: String,
    /// Urgency tier assigned at ingestion.
    pub severity: Severity,
    /// Start of the validity window.
    pub effective_start: DateTime<Utc>,
    /// End of the validity window. Always concrete; records ingested
    /// without one get `effective_start + DEFAULT_VALIDITY_HOURS`.
    pub effective_end: DateTime<Utc>,
    /// Which upstream produced this record.
    pub source: Source,
}

impl NotamRecord {
    /// Build a record, materializing a bounded validity window when the
    /// upstream supplied no end time.
    pub fn new(
        id: impl Into<String>,
        location: impl Into<String>,
        raw_text: impl Into<String>,
        canonical_text: impl Into<String>,
        severity: Severity,
        source: Source,
        effective_start: DateTime<Utc>,
        effective_end: Option<DateTime<Utc>>,
    ) -> Self {
        let effective_end = effective_end
            .unwrap_or_else(|| effective_start + Duration::hours(DEFAULT_VALIDITY_HOURS));
        Self {
            id: id.into(),
            location: location.into(),
            raw_text: raw_text.into(),
            canonical_text: canonical_text.into(),
            severity,
            effective_start,
            effective_end,
            source,
        }
    }

    /// Whether the record is still inside its validity window at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.effective_end > now
    }
}

/// Availability of a single navigation aid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavaidState {
    Available,
    Unavailable,
}

/// Derived availability map, navaid id to state.
///
/// Purely a function of the active record set at derivation time; a BTreeMap
/// keeps API output ordering stable.
pub type EquipmentStatus = BTreeMap<String, NavaidState>;
