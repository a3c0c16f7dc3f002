//! Error types for mimic

use thiserror::Error;

use crate::EntityId;

/// Core mimic errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MimicError {
    // Wire errors
    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Unsupported wire version: {0}")]
    UnsupportedVersion(u8),

    #[error("Unknown payload kind: {0}")]
    UnknownPayloadKind(u8),

    #[error("Envelope too large: {size} > {max}")]
    EnvelopeTooLarge { size: usize, max: usize },

    // Configuration errors
    #[error("Unknown parameter kind: {0}")]
    UnknownParameterKind(i32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Application errors
    #[error("Parameter count mismatch: local {local}, received {received}")]
    CardinalityMismatch { local: usize, received: usize },

    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityId),

    // Transport errors
    #[error("Transport error: {0}")]
    TransportError(String),
}

impl MimicError {
    /// Configuration errors mean the animation definition and the codec
    /// disagree. They must reach the host instead of being swallowed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MimicError::UnknownParameterKind(_) | MimicError::InvalidConfig(_)
        )
    }
}

/// Result type for mimic operations
pub type MimicResult<T> = Result<T, MimicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(MimicError::UnknownParameterKind(7).is_fatal());
        assert!(MimicError::InvalidConfig("rate".into()).is_fatal());
        assert!(!MimicError::CardinalityMismatch { local: 2, received: 3 }.is_fatal());
        assert!(!MimicError::TransportError("down".into()).is_fatal());
    }

    #[test]
    fn test_display() {
        let err = MimicError::CardinalityMismatch { local: 2, received: 3 };
        assert_eq!(err.to_string(), "Parameter count mismatch: local 2, received 3");
    }
}
