//! Text pipeline for turning raw NOTAM payloads into canonical records.
//!
//! Everything in this crate is pure and total: no I/O, no shared state, and
//! no input that can make a function fail. The worst any function does with
//! garbage is return the input with whitespace collapsed (normalization) or
//! `None` (extraction).
//!
//! # Pipeline
//!
//! ```text
//! transport payload --> extract_payload --> normalize --> classify
//!                       (encoding probe)    (canonical)   (severity tier)
//! ```

pub mod ident;
pub mod payload;
pub mod severity;
pub mod text;

pub use ident::{extract_id, surrogate_id};
pub use payload::{extract_payload, ExtractedPayload};
pub use severity::classify;
pub use text::normalize;
