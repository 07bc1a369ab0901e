//! Error types for the feed listener.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("NATS connect error: {0}")]
    Connect(#[from] async_nats::ConnectError),

    #[error("NATS subscribe error: {0}")]
    Subscribe(#[from] async_nats::SubscribeError),

    #[error("connect attempt timed out")]
    ConnectTimeout,

    #[error("feed connection lost")]
    ConnectionLost,

    #[error("ingest channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
