//! Mimic Transport Layer - delivery of encoded envelopes
//!
//! This crate provides:
//! - The transport capability consumed by the replication core
//! - The dispatcher (envelope serialization + hand-off)
//! - An in-process loopback transport
//! - A UDP transport

pub mod dispatcher;
pub mod loopback;
pub mod transport;
pub mod udp;

pub use dispatcher::*;
pub use loopback::*;
pub use transport::*;
pub use udp::*;
