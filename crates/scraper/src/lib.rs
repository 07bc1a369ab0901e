//! Fallback NOTAM scraper.
//!
//! Periodically fetches the HTML notice listing for the airfield and
//! extracts notices with an ordered chain of parse strategies. A failed
//! fetch or an empty parse leaves the store exactly as it was; only a
//! successful non-empty parse replaces the prior fallback batch.

pub mod error;
pub mod parse;
pub mod service;

pub use error::Error;
pub use parse::extract_blocks;
pub use service::{ScraperConfig, ScraperService};
