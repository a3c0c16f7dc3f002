//! Mimic Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the mimic workspace:
//! - Identifiers (NodeId, EntityId, StateHash, TransitionHash)
//! - Wire constants (ParameterKind, PayloadKind)
//! - Replicated messages (ParameterSnapshot, StateChange)
//! - The shared error type

pub mod id;
pub mod kind;
pub mod message;
pub mod error;

pub use id::*;
pub use kind::*;
pub use message::*;
pub use error::*;
