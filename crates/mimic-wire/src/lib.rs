//! Mimic Wire Protocol - Binary envelope format
//!
//! This crate implements the wire format for replicated animation state:
//! - Fixed envelope header (16 bytes)
//! - Envelope flags (reliability)
//! - Parameter snapshot and state change payloads

pub mod envelope;
pub mod flags;
pub mod header;
pub mod payload;

pub use envelope::*;
pub use flags::*;
pub use header::*;
pub use payload::*;
