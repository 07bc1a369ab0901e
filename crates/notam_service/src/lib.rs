//! NOTAM aggregation service.
//!
//! Owns the authoritative in-memory active set, derives navaid availability
//! from it, and serves both over a small HTTP read API. Records arrive from
//! two independent sources: the live feed listener and the fallback
//! scraper.
//!
//! # Architecture
//!
//! ```text
//! feed listener ----\
//!                    +--> ingest task --> NotamStore --> EquipmentBoard
//! fallback scraper -/         ^               |
//!                         sweep timer     HTTP read API
//! ```

pub mod api;
pub mod equipment;
pub mod service;
pub mod store;

pub use api::{create_router, AppState};
pub use equipment::{EquipmentBoard, NavaidTable};
pub use service::{run_sweeper, IngestService};
pub use store::{NotamStore, StoreStats};
