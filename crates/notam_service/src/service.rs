//! Store-owning tasks: ingest application and the expiry sweeper.
//!
//! Both sources funnel their output through one mpsc channel into the
//! ingest task, so store mutations apply in wall-clock processing order and
//! a fallback batch is never interleaved with a feed upsert.

use crate::equipment::EquipmentBoard;
use crate::store::NotamStore;
use chrono::Utc;
use common::IngestEvent;
use metrics::{counter, gauge};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Applies ingest events to the store and keeps the equipment board fresh.
pub struct IngestService {
    store: NotamStore,
    board: EquipmentBoard,
    ingest_rx: mpsc::Receiver<IngestEvent>,
}

impl IngestService {
    pub fn new(
        store: NotamStore,
        board: EquipmentBoard,
        ingest_rx: mpsc::Receiver<IngestEvent>,
    ) -> Self {
        Self {
            store,
            board,
            ingest_rx,
        }
    }

    /// Run until every producer has dropped its sender.
    pub async fn run(mut self) {
        while let Some(event) = self.ingest_rx.recv().await {
            let location = match event {
                IngestEvent::Upsert(record) => {
                    let location = record.location.clone();
                    self.store.upsert(record);
                    location
                }
                IngestEvent::ReplaceBatch {
                    source,
                    location,
                    records,
                } => {
                    counter!("store_batch_replacements_total").increment(1);
                    self.store.replace_source_batch(source, &location, records);
                    location
                }
            };

            // Equipment state is a pure function of the active set, so it is
            // recomputed after every mutation rather than toggled in place.
            let now = Utc::now();
            let active = self.store.query_active(&location, now);
            gauge!("store_active_records").set(active.len() as f64);
            self.board.rederive(&active, now);
        }
        info!("ingest channel drained, ingest service stopping");
    }
}

/// Periodic expiry sweep, independent of ingestion activity so records
/// expire on time even when no new traffic arrives.
pub async fn run_sweeper(
    store: NotamStore,
    board: EquipmentBoard,
    location: String,
    interval: Duration,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // the immediate first tick has nothing to sweep

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.recv() => {
                info!("sweeper received shutdown signal");
                return;
            }

            _ = ticker.tick() => {
                let now = Utc::now();
                let removed = store.sweep(now);
                if removed > 0 {
                    info!(removed, "expiry sweep");
                }
                let active = store.query_active(&location, now);
                gauge!("store_active_records").set(active.len() as f64);
                board.rederive(&active, now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::NavaidTable;
    use chrono::Duration as ChronoDuration;
    use common::{NavaidState, NotamRecord, Severity, Source};

    fn outage_record(end_in_minutes: i64) -> NotamRecord {
        let now = Utc::now();
        NotamRecord::new(
            "MGM 05/044",
            "KMGM",
            "!MGM 05/044 ILS RWY 10 U/S",
            "!MGM 05/044 ILS RWY 10 U/S",
            Severity::Critical,
            Source::Feed,
            now,
            Some(now + ChronoDuration::minutes(end_in_minutes)),
        )
    }

    #[tokio::test]
    async fn ingest_applies_upserts_and_rederives() {
        let store = NotamStore::new();
        let board = EquipmentBoard::new(NavaidTable::builtin(), Duration::from_secs(60));
        let (tx, rx) = mpsc::channel(8);
        let service = IngestService::new(store.clone(), board.clone(), rx);
        let handle = tokio::spawn(service.run());

        tx.send(IngestEvent::Upsert(outage_record(30))).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        let now = Utc::now();
        assert_eq!(store.query_active("KMGM", now).len(), 1);
        assert_eq!(board.status(now)["ils-rwy-10"], NavaidState::Unavailable);
    }

    #[tokio::test]
    async fn sweep_clears_stale_equipment_flags() {
        let store = NotamStore::new();
        let board = EquipmentBoard::new(NavaidTable::builtin(), Duration::from_secs(60));
        store.upsert(outage_record(-5));

        let now = Utc::now();
        board.rederive(&store.query_active("KMGM", now), now);
        assert_eq!(board.status(now)["ils-rwy-10"], NavaidState::Available);

        assert_eq!(store.sweep(now), 1);
        assert!(store.query_active("KMGM", now).is_empty());
    }

    #[tokio::test]
    async fn batch_replacement_applies_atomically() {
        let store = NotamStore::new();
        let board = EquipmentBoard::new(NavaidTable::builtin(), Duration::from_secs(60));
        let (tx, rx) = mpsc::channel(8);
        let service = IngestService::new(store.clone(), board.clone(), rx);
        let handle = tokio::spawn(service.run());

        let batch = scraper::service::build_batch(
            &[
                "!MGM 05/012 RWY 10/28 CLSD".to_string(),
                "!MGM 05/013 TWY A CLSD".to_string(),
                "!MGM 05/014 TACAN OTS".to_string(),
            ],
            "KMGM",
        );
        tx.send(IngestEvent::ReplaceBatch {
            source: Source::Fallback,
            location: "KMGM".to_string(),
            records: batch,
        })
        .await
        .unwrap();
        drop(tx);
        handle.await.unwrap();

        let now = Utc::now();
        assert_eq!(store.query_active("KMGM", now).len(), 3);
        assert_eq!(board.status(now)["tacan"], NavaidState::Unavailable);
    }
}
