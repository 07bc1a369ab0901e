//! Common types, configuration, and messages for the NOTAM aggregator.

pub mod config;
pub mod messages;
pub mod schema;

pub use config::{Config, ConfigError};
pub use messages::IngestEvent;
pub use schema::{EquipmentStatus, NavaidState, NotamRecord, Severity, Source};
