//! Live NOTAM feed listener.
//!
//! Maintains a persistent NATS subscription and turns pushed messages into
//! store upserts. Connection loss never kills the listener: it drops back to
//! `Disconnected`, waits a fixed backoff, and reconnects.

pub mod error;
pub mod listener;

pub use error::Error;
pub use listener::{FeedConfig, FeedListener, ListenerState};
