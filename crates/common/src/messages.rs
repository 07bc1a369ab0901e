//! Messages passed from the ingestion sources to the store task.

use crate::schema::{NotamRecord, Source};

/// Events emitted by the feed listener and the fallback scraper.
///
/// Both sources run as independent tasks and hand their output to a single
/// ingest task that owns all store mutations, so ordering within the channel
/// is the ordering applied to the store.
#[derive(Debug, Clone)]
pub enum IngestEvent {
    /// A single record pushed from the live feed, applied as an upsert.
    Upsert(NotamRecord),
    /// A complete successful scrape for one location. Replaces every prior
    /// record with the same (source, location) pair in one atomic step.
    /// Never sent for a failed or empty scrape cycle.
    ReplaceBatch {
        source: Source,
        location: String,
        records: Vec<NotamRecord>,
    },
}
