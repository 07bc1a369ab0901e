//! In-memory active NOTAM set.
//!
//! The store is the only shared mutable state in the process. Every
//! mutation takes the single write lock for its whole duration, so a reader
//! never observes a partially applied batch replacement.

use chrono::{DateTime, Utc};
use common::{NotamRecord, Source};
use metrics::counter;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, error};

/// Shared handle to the active record set.
#[derive(Debug, Clone, Default)]
pub struct NotamStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Debug, Default)]
struct StoreInner {
    /// id -> record plus arrival sequence.
    records: HashMap<String, StoredRecord>,
    /// Monotonic arrival counter; gives query output a stable tie order.
    next_seq: u64,
    /// Clock watermark from the last sweep, to catch a bogus caller clock.
    last_sweep: Option<DateTime<Utc>>,
    total_upserts: u64,
    total_swept: u64,
}

#[derive(Debug, Clone)]
struct StoredRecord {
    record: NotamRecord,
    seq: u64,
}

/// Snapshot of store counters for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub active_records: usize,
    pub feed_records: usize,
    pub fallback_records: usize,
    pub total_upserts: u64,
    pub total_swept: u64,
}

impl NotamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by id. A replacement is wholesale: no field merge,
    /// last writer wins regardless of source. The replacement gets a fresh
    /// arrival sequence.
    pub fn upsert(&self, record: NotamRecord) {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.total_upserts += 1;
        debug!(id = %record.id, "store upsert");
        inner.records.insert(record.id.clone(), StoredRecord { record, seq });
    }

    /// Remove every record whose validity window has ended by `now`.
    /// Returns the number removed.
    ///
    /// A `now` behind the previous sweep indicates a caller bug; the sweep
    /// is refused so a bad clock cannot resurrect expiry decisions.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if let Some(last) = inner.last_sweep {
            if now < last {
                error!(%now, %last, "sweep clock moved backwards, refusing sweep");
                return 0;
            }
        }
        inner.last_sweep = Some(now);

        let before = inner.records.len();
        inner.records.retain(|_, stored| stored.record.effective_end > now);
        let removed = before - inner.records.len();
        inner.total_swept += removed as u64;
        if removed > 0 {
            counter!("store_records_swept_total").increment(removed as u64);
            debug!(removed, "sweep removed expired records");
        }
        removed
    }

    /// All non-expired records for a location, most urgent first, arrival
    /// order on severity ties.
    pub fn query_active(&self, location: &str, now: DateTime<Utc>) -> Vec<NotamRecord> {
        let inner = self.inner.read().expect("store lock poisoned");
        let mut matches: Vec<&StoredRecord> = inner
            .records
            .values()
            .filter(|s| s.record.location == location && s.record.is_active(now))
            .collect();
        matches.sort_by_key(|s| (s.record.severity, s.seq));
        matches.into_iter().map(|s| s.record.clone()).collect()
    }

    /// Atomically replace every record with the given (source, location)
    /// pair with the new batch. Callers only invoke this for a successful
    /// non-empty parse; a failed cycle must leave the prior batch in place.
    pub fn replace_source_batch(
        &self,
        source: Source,
        location: &str,
        records: Vec<NotamRecord>,
    ) {
        let mut inner = self.inner.write().expect("store lock poisoned");
        inner
            .records
            .retain(|_, s| !(s.record.source == source && s.record.location == location));
        for record in records {
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.total_upserts += 1;
            inner.records.insert(record.id.clone(), StoredRecord { record, seq });
        }
    }

    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.read().expect("store lock poisoned");
        let feed_records = inner
            .records
            .values()
            .filter(|s| s.record.source == Source::Feed)
            .count();
        StoreStats {
            active_records: inner.records.len(),
            feed_records,
            fallback_records: inner.records.len() - feed_records,
            total_upserts: inner.total_upserts,
            total_swept: inner.total_swept,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use common::Severity;

    fn record(id: &str, severity: Severity, source: Source, end_in_hours: i64) -> NotamRecord {
        let now = Utc::now();
        NotamRecord::new(
            id,
            "KMGM",
            format!("raw {id}"),
            format!("canonical {id}"),
            severity,
            source,
            now,
            Some(now + Duration::hours(end_in_hours)),
        )
    }

    #[test]
    fn upsert_same_id_keeps_latest_text() {
        let store = NotamStore::new();
        store.upsert(record("MGM 05/012", Severity::Info, Source::Feed, 2));
        let mut updated = record("MGM 05/012", Severity::Critical, Source::Feed, 2);
        updated.canonical_text = "RWY 10/28 CLSD".to_string();
        store.upsert(updated);

        let active = store.query_active("KMGM", Utc::now());
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].canonical_text, "RWY 10/28 CLSD");
        assert_eq!(active[0].severity, Severity::Critical);
    }

    #[test]
    fn sweep_removes_only_expired_records() {
        let store = NotamStore::new();
        store.upsert(record("A", Severity::Info, Source::Feed, -1));
        store.upsert(record("B", Severity::Info, Source::Feed, 1));

        let removed = store.sweep(Utc::now());
        assert_eq!(removed, 1);

        let active = store.query_active("KMGM", Utc::now());
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "B");
    }

    #[test]
    fn sweep_refuses_backwards_clock() {
        let store = NotamStore::new();
        store.upsert(record("A", Severity::Info, Source::Feed, -1));
        let now = Utc::now();
        store.sweep(now);
        assert_eq!(store.sweep(now - Duration::hours(1)), 0);
    }

    #[test]
    fn query_sorts_by_severity_then_arrival() {
        let store = NotamStore::new();
        store.upsert(record("info-1", Severity::Info, Source::Feed, 2));
        store.upsert(record("crit-1", Severity::Critical, Source::Feed, 2));
        store.upsert(record("med-1", Severity::Medium, Source::Feed, 2));
        store.upsert(record("crit-2", Severity::Critical, Source::Feed, 2));

        let ids: Vec<String> = store
            .query_active("KMGM", Utc::now())
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["crit-1", "crit-2", "med-1", "info-1"]);
    }

    #[test]
    fn query_filters_location_and_expiry() {
        let store = NotamStore::new();
        store.upsert(record("expired", Severity::Critical, Source::Feed, -1));
        let mut other = record("other-loc", Severity::Critical, Source::Feed, 2);
        other.location = "KXYZ".to_string();
        store.upsert(other);

        assert!(store.query_active("KMGM", Utc::now()).is_empty());
        assert_eq!(store.query_active("KXYZ", Utc::now()).len(), 1);
    }

    #[test]
    fn replace_batch_only_touches_matching_source_and_location() {
        let store = NotamStore::new();
        store.upsert(record("feed-1", Severity::Info, Source::Feed, 2));
        store.replace_source_batch(
            Source::Fallback,
            "KMGM",
            vec![
                record("fb-1", Severity::Info, Source::Fallback, 2),
                record("fb-2", Severity::Info, Source::Fallback, 2),
            ],
        );

        // New fallback batch supersedes the old one, feed record untouched.
        store.replace_source_batch(
            Source::Fallback,
            "KMGM",
            vec![record("fb-3", Severity::Info, Source::Fallback, 2)],
        );

        let mut ids: Vec<String> = store
            .query_active("KMGM", Utc::now())
            .into_iter()
            .map(|r| r.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["fb-3", "feed-1"]);
    }

    #[test]
    fn stats_counts_by_source() {
        let store = NotamStore::new();
        store.upsert(record("feed-1", Severity::Info, Source::Feed, 2));
        store.upsert(record("fb-1", Severity::Info, Source::Fallback, 2));
        let stats = store.stats();
        assert_eq!(stats.active_records, 2);
        assert_eq!(stats.feed_records, 1);
        assert_eq!(stats.fallback_records, 1);
        assert_eq!(stats.total_upserts, 2);
    }
}
