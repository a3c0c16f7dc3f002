//! Mimic Test Harness - Lossy networks and multi-peer validation
//!
//! This crate provides:
//! - Seeded lossy/reordering/duplicating links
//! - A multi-peer session simulator running the real runtime
//! - A random animation driver and convergence harness
//! - End-to-end replication scenarios

pub mod chaos;
pub mod integration;
pub mod simulator;

pub use chaos::*;
pub use integration::*;
pub use simulator::*;
