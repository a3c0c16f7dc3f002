//! Mimic Runtime - Per-entity replication and the peer frame loop
//!
//! Sender path, once per frame for every owned entity:
//! 1. Rate limiter gate
//! 2. Sample parameters, encode, dispatch
//! 3. Observe state/transition, detect change
//! 4. On change (or refresh), re-query, encode, dispatch
//!
//! Receiver path, per inbound envelope:
//! 1. Parse
//! 2. Route to the entity
//! 3. Apply unless locally authoritative

pub mod config;
pub mod logging;
pub mod peer;
pub mod replicator;

pub use config::*;
pub use logging::*;
pub use peer::*;
pub use replicator::*;
