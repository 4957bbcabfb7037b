//! numdraw-core: a draw-bias engine.
//!
//! Draws numbers from a bounded pool under admin-configured bias
//! rules. Rate rules fire on a fixed period of qualifying picks and
//! suppress their number in between; chain rules force a follow-up
//! number on the pick after their trigger is drawn. Every accepted
//! number lands in a masked, append-only per-mode ledger and every
//! pick emits a structured audit record. Rule counters persist
//! across restarts; the masking is obfuscation against casual
//! tampering, not encryption.

pub mod audit;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod gates;
pub mod ledger;
pub mod rng;
pub mod roster;
pub mod store;
pub mod types;
