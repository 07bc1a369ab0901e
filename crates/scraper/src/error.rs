//! Error types for the fallback scraper.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("listing returned status {0}")]
    BadStatus(reqwest::StatusCode),

    #[error("no parse strategy yielded any notice block")]
    EmptyParse,

    #[error("ingest channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
