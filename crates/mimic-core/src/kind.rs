//! Wire constants
//!
//! Parameter kind codes are legacy engine values (1, 3, 4, 9), not ordinal
//! positions. They must never be renumbered.

/// Declared type of an animation parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ParameterKind {
    /// Continuous float input
    Float = 1,
    /// Integer input
    Int = 3,
    /// Boolean input
    Bool = 4,
    /// One-shot trigger, auto-reset by the engine once consumed
    Trigger = 9,
}

impl ParameterKind {
    /// Parse from a wire / engine code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ParameterKind::Float),
            3 => Some(ParameterKind::Int),
            4 => Some(ParameterKind::Bool),
            9 => Some(ParameterKind::Trigger),
            _ => None,
        }
    }

    /// Convert to wire code
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Payload carried by an envelope
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PayloadKind {
    /// Full parameter vector, sent every sampling tick
    ParameterSnapshot = 0x01,
    /// Discrete state change, sent only when the detector fires
    StateChange = 0x02,
}

impl PayloadKind {
    /// Parse from wire byte
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(PayloadKind::ParameterSnapshot),
            0x02 => Some(PayloadKind::StateChange),
            _ => None,
        }
    }

    /// Convert to wire byte
    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_kind_codes_are_legacy_values() {
        assert_eq!(ParameterKind::Float.code(), 1);
        assert_eq!(ParameterKind::Int.code(), 3);
        assert_eq!(ParameterKind::Bool.code(), 4);
        assert_eq!(ParameterKind::Trigger.code(), 9);
    }

    #[test]
    fn test_parameter_kind_rejects_unknown_codes() {
        for code in [0, 2, 5, 6, 7, 8, 10, -1] {
            assert_eq!(ParameterKind::from_code(code), None, "code {code}");
        }
        assert_eq!(ParameterKind::from_code(9), Some(ParameterKind::Trigger));
    }

    #[test]
    fn test_payload_kind_byte() {
        for kind in [PayloadKind::ParameterSnapshot, PayloadKind::StateChange] {
            assert_eq!(PayloadKind::from_byte(kind.to_byte()), Some(kind));
        }
        assert_eq!(PayloadKind::from_byte(0x00), None);
    }
}
