//! Timer-driven scrape service.

use crate::error::{Error, Result};
use crate::parse::extract_blocks;
use chrono::Utc;
use common::{IngestEvent, NotamRecord, Source};
use metrics::counter;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Scraper parameters.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Fully resolved listing URL for the airfield.
    pub url: String,
    /// Location code assigned to every scraped record.
    pub location: String,
    /// Time between scrape cycles.
    pub interval: Duration,
    /// Bound on a single fetch.
    pub timeout: Duration,
}

/// Periodically scrapes the NOTAM listing and replaces the fallback batch.
///
/// A cycle that fails for any reason (network, timeout, unparseable page)
/// logs and leaves the store untouched; the next cycle starts on schedule.
pub struct ScraperService {
    config: ScraperConfig,
    http: reqwest::Client,
    ingest_tx: mpsc::Sender<IngestEvent>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl ScraperService {
    pub fn new(
        config: ScraperConfig,
        ingest_tx: mpsc::Sender<IngestEvent>,
        shutdown_rx: mpsc::Receiver<()>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            config,
            http,
            ingest_tx,
            shutdown_rx,
        })
    }

    /// Run the scrape loop. The first cycle fires immediately to seed the
    /// store at startup.
    pub async fn run(self) -> Result<()> {
        let Self {
            config,
            http,
            ingest_tx,
            mut shutdown_rx,
        } = self;

        info!("scraper running, url={} interval={:?}", config.url, config.interval);
        let mut ticker = tokio::time::interval(config.interval);

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => {
                    info!("scraper received shutdown signal");
                    return Ok(());
                }

                _ = ticker.tick() => {
                    match run_cycle(&http, &config, &ingest_tx).await {
                        Ok(count) => {
                            counter!("scraper_cycles_total", "outcome" => "ok").increment(1);
                            info!("scrape cycle complete, {count} records");
                        }
                        Err(Error::ChannelClosed) => {
                            info!("ingest channel closed, stopping scraper");
                            return Ok(());
                        }
                        Err(e) => {
                            // Transient: keep last known fallback state.
                            counter!("scraper_cycles_total", "outcome" => "failed").increment(1);
                            warn!("scrape cycle failed: {e}");
                        }
                    }
                }
            }
        }
    }
}

/// One fetch-parse-replace cycle. Only a successful parse with at least one
/// block sends a batch replacement; every failure path returns before the
/// send, leaving the prior fallback batch in place.
async fn run_cycle(
    http: &reqwest::Client,
    config: &ScraperConfig,
    ingest_tx: &mpsc::Sender<IngestEvent>,
) -> Result<usize> {
    let response = http.get(&config.url).send().await?;
    if !response.status().is_success() {
        return Err(Error::BadStatus(response.status()));
    }
    let html = response.text().await?;

    let (strategy, blocks) = extract_blocks(&html).ok_or(Error::EmptyParse)?;
    debug!("strategy '{strategy}' yielded {} blocks", blocks.len());

    let records = build_batch(&blocks, &config.location);
    if records.is_empty() {
        return Err(Error::EmptyParse);
    }
    let count = records.len();

    ingest_tx
        .send(IngestEvent::ReplaceBatch {
            source: Source::Fallback,
            location: config.location.clone(),
            records,
        })
        .await
        .map_err(|_| Error::ChannelClosed)?;

    Ok(count)
}

/// Normalize scraped blocks into fallback-sourced records with a default
/// 24-hour validity window.
pub fn build_batch(blocks: &[String], location: &str) -> Vec<NotamRecord> {
    let now = Utc::now();
    blocks
        .iter()
        .filter_map(|block| {
            let canonical = normalizer::normalize(block);
            if canonical.is_empty() {
                return None;
            }
            let severity = normalizer::classify(&canonical);
            let id = normalizer::extract_id(block)
                .unwrap_or_else(|| normalizer::surrogate_id(location, &canonical));
            Some(NotamRecord::new(
                id,
                location,
                block.clone(),
                canonical,
                severity,
                Source::Fallback,
                now,
                None,
            ))
        })
        .collect()
}
