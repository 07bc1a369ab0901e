//! NATS feed listener with explicit connection state machine.

use crate::error::{Error, Result};
use chrono::Utc;
use common::{IngestEvent, NotamRecord, Source};
use futures::StreamExt;
use metrics::{counter, gauge};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Feed connection parameters.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// NATS server URL.
    pub url: String,
    /// Subject the upstream publishes NOTAM messages on.
    pub subject: String,
    /// Optional credentials.
    pub user: Option<String>,
    pub password: Option<String>,
    /// Airfield this listener accepts notices for; everything else is dropped.
    pub location: String,
    /// Bound on a single connection attempt.
    pub connect_timeout: Duration,
    /// Fixed delay before a reconnect attempt.
    pub reconnect_backoff: Duration,
}

/// Connection lifecycle of the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Disconnected,
    Connecting,
    Connected,
    /// Subscribed and consuming messages.
    Bound,
}

/// Consumes the live NOTAM feed and hands records to the ingest task.
///
/// Each message is processed independently: a malformed or foreign-location
/// message is dropped without affecting subsequent messages or the
/// connection.
pub struct FeedListener {
    config: FeedConfig,
    ingest_tx: mpsc::Sender<IngestEvent>,
    shutdown_rx: mpsc::Receiver<()>,
    state: ListenerState,
}

impl FeedListener {
    pub fn new(
        config: FeedConfig,
        ingest_tx: mpsc::Sender<IngestEvent>,
        shutdown_rx: mpsc::Receiver<()>,
    ) -> Self {
        Self {
            config,
            ingest_tx,
            shutdown_rx,
            state: ListenerState::Disconnected,
        }
    }

    /// Run the listener. Reconnects after the configured backoff on every
    /// failure until shutdown is signalled.
    pub async fn run(mut self) -> Result<()> {
        let mut shutdown = false;

        while !shutdown {
            match self.connect_and_consume(&mut shutdown).await {
                Ok(()) => {
                    info!("feed listener stopped");
                    break;
                }
                Err(Error::ChannelClosed) => {
                    // The ingest side is gone; the process is shutting down.
                    info!("ingest channel closed, stopping feed listener");
                    break;
                }
                Err(e) => {
                    self.set_state(ListenerState::Disconnected);
                    counter!("feed_disconnects_total").increment(1);
                    warn!(
                        "feed connection failed: {e}, reconnecting in {:?}",
                        self.config.reconnect_backoff
                    );
                    // The backoff must stay responsive to shutdown, or an
                    // unreachable endpoint pins the task in this loop.
                    tokio::select! {
                        biased;

                        _ = self.shutdown_rx.recv() => {
                            info!("feed listener received shutdown signal");
                            break;
                        }

                        _ = tokio::time::sleep(self.config.reconnect_backoff) => {}
                    }
                }
            }
        }

        self.set_state(ListenerState::Disconnected);
        Ok(())
    }

    async fn connect_and_consume(&mut self, shutdown: &mut bool) -> Result<()> {
        self.set_state(ListenerState::Connecting);
        info!("connecting to feed at {}", self.config.url);

        let mut options = async_nats::ConnectOptions::new()
            .connection_timeout(self.config.connect_timeout);
        if let (Some(user), Some(password)) = (&self.config.user, &self.config.password) {
            options = options.user_and_password(user.clone(), password.clone());
        }

        // The client-side timeout covers TCP connect; the outer timeout also
        // bounds a handshake that stalls after the socket opens. The attempt
        // itself is raced against shutdown so a slow endpoint cannot delay
        // process exit by a full timeout.
        let connect = tokio::time::timeout(
            self.config.connect_timeout,
            options.connect(self.config.url.as_str()),
        );
        let client = tokio::select! {
            biased;

            _ = self.shutdown_rx.recv() => {
                info!("feed listener received shutdown signal");
                *shutdown = true;
                return Ok(());
            }

            result = connect => result.map_err(|_| Error::ConnectTimeout)??,
        };

        self.set_state(ListenerState::Connected);
        info!("feed connected, subscribing to {}", self.config.subject);

        let mut subscriber = client.subscribe(self.config.subject.clone()).await?;
        self.set_state(ListenerState::Bound);
        info!("feed bound to {}", self.config.subject);

        let ingest_tx = self.ingest_tx.clone();
        let location = self.config.location.clone();

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.recv() => {
                    info!("feed listener received shutdown signal");
                    *shutdown = true;
                    return Ok(());
                }

                msg = subscriber.next() => {
                    match msg {
                        Some(msg) => handle_message(&ingest_tx, &location, &msg.payload).await?,
                        None => {
                            warn!("feed subscription ended");
                            return Err(Error::ConnectionLost);
                        }
                    }
                }
            }
        }
    }

    fn set_state(&mut self, state: ListenerState) {
        debug!(from = ?self.state, to = ?state, "feed listener state change");
        self.state = state;
        let value = match state {
            ListenerState::Disconnected => 0.0,
            ListenerState::Connecting => 1.0,
            ListenerState::Connected => 2.0,
            ListenerState::Bound => 3.0,
        };
        gauge!("feed_connection_state").set(value);
    }
}

/// Process one inbound message. Only a closed ingest channel is an error;
/// undecodable or foreign-location messages are dropped so a bad message
/// never blocks the ones behind it.
async fn handle_message(
    ingest_tx: &mpsc::Sender<IngestEvent>,
    airfield: &str,
    payload: &[u8],
) -> Result<()> {
    counter!("feed_messages_received_total").increment(1);

    let record = match build_record(payload, airfield) {
        Some(record) => record,
        None => {
            counter!("feed_messages_dropped_total").increment(1);
            return Ok(());
        }
    };

    debug!(id = %record.id, severity = ?record.severity, "feed record ingested");
    counter!("feed_records_ingested_total").increment(1);

    ingest_tx
        .send(IngestEvent::Upsert(record))
        .await
        .map_err(|_| Error::ChannelClosed)
}

/// Turn raw message bytes into a feed-sourced record, or `None` when the
/// payload is undecodable, carries no location, or names another airfield.
pub fn build_record(payload: &[u8], airfield: &str) -> Option<NotamRecord> {
    let extracted = normalizer::extract_payload(payload)?;
    let location = extracted.location?;
    if location != airfield {
        debug!(%location, "dropping notice for other airfield");
        return None;
    }

    let canonical = normalizer::normalize(&extracted.text);
    if canonical.is_empty() {
        return None;
    }
    let severity = normalizer::classify(&canonical);
    let id = normalizer::extract_id(&extracted.text)
        .unwrap_or_else(|| normalizer::surrogate_id(&location, &canonical));

    Some(NotamRecord::new(
        id,
        location,
        extracted.text,
        canonical,
        severity,
        Source::Feed,
        Utc::now(),
        None,
    ))
}
