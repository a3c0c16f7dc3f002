//! Mimic State Engine - Animation sampling and application
//!
//! This crate implements the replication core:
//! - Rate limiting of sampling passes
//! - Animation backend capability
//! - Snapshot reading
//! - Change detection over the state/transition graph
//! - Message encoding
//! - Remote application on observing peers
//! - Authority checking

pub mod applicator;
pub mod authority;
pub mod backend;
pub mod detector;
pub mod encoder;
pub mod memory;
pub mod rate;
pub mod snapshot;

pub use applicator::*;
pub use authority::*;
pub use backend::*;
pub use detector::*;
pub use encoder::*;
pub use memory::*;
pub use rate::*;
pub use snapshot::*;
