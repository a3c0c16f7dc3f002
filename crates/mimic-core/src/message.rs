//! Replicated animation messages
//!
//! Two payloads cross the network: a full [`ParameterSnapshot`] every
//! sampling tick and a [`StateChange`] whenever the sender's detector fires.

use crate::{ParameterKind, StateHash};

/// Typed parameter value.
///
/// On the wire every entry carries all three scalar slots (`_int`,
/// `_float`, `_bool`); the kind code selects the meaningful one. A trigger
/// uses the `_bool` slot for its armed flag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParameterValue {
    Float(f32),
    Int(i64),
    Bool(bool),
    /// Trigger with its armed flag
    Trigger(bool),
}

impl ParameterValue {
    /// Declared kind of this value
    pub fn kind(&self) -> ParameterKind {
        match self {
            ParameterValue::Float(_) => ParameterKind::Float,
            ParameterValue::Int(_) => ParameterKind::Int,
            ParameterValue::Bool(_) => ParameterKind::Bool,
            ParameterValue::Trigger(_) => ParameterKind::Trigger,
        }
    }

    /// Wire `_int` slot
    pub fn int_slot(&self) -> i64 {
        match *self {
            ParameterValue::Int(v) => v,
            _ => 0,
        }
    }

    /// Wire `_float` slot
    pub fn float_slot(&self) -> f32 {
        match *self {
            ParameterValue::Float(v) => v,
            _ => 0.0,
        }
    }

    /// Wire `_bool` slot
    pub fn bool_slot(&self) -> bool {
        match *self {
            ParameterValue::Bool(v) | ParameterValue::Trigger(v) => v,
            _ => false,
        }
    }

    /// Rebuild a value from the flattened wire slots
    pub fn from_slots(kind: ParameterKind, int: i64, float: f32, boolean: bool) -> Self {
        match kind {
            ParameterKind::Float => ParameterValue::Float(float),
            ParameterKind::Int => ParameterValue::Int(int),
            ParameterKind::Bool => ParameterValue::Bool(boolean),
            ParameterKind::Trigger => ParameterValue::Trigger(boolean),
        }
    }
}

/// One named parameter and its sampled value
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDescriptor {
    /// Parameter identifier as declared in the animation definition
    pub name: String,
    /// Sampled value
    pub value: ParameterValue,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, value: ParameterValue) -> Self {
        ParameterDescriptor {
            name: name.into(),
            value,
        }
    }

    #[inline]
    pub fn kind(&self) -> ParameterKind {
        self.value.kind()
    }
}

/// Ordered parameter vector for one entity at one tick.
///
/// Order is the backend's declaration order; receivers correlate entries by
/// position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterSnapshot {
    descriptors: Vec<ParameterDescriptor>,
}

impl ParameterSnapshot {
    pub fn new() -> Self {
        ParameterSnapshot::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ParameterSnapshot {
            descriptors: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, descriptor: ParameterDescriptor) {
        self.descriptors.push(descriptor);
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.descriptors.iter()
    }

    pub fn descriptors(&self) -> &[ParameterDescriptor] {
        &self.descriptors
    }
}

impl From<Vec<ParameterDescriptor>> for ParameterSnapshot {
    fn from(descriptors: Vec<ParameterDescriptor>) -> Self {
        ParameterSnapshot { descriptors }
    }
}

impl FromIterator<ParameterDescriptor> for ParameterSnapshot {
    fn from_iter<I: IntoIterator<Item = ParameterDescriptor>>(iter: I) -> Self {
        ParameterSnapshot {
            descriptors: iter.into_iter().collect(),
        }
    }
}

/// Discrete state change: jump to `state_hash` at `normalized_time`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateChange {
    /// Target (or current) state; `StateHash::NONE` is a no-op
    pub state_hash: StateHash,
    /// Progress within the state, nominally [0, 1)
    pub normalized_time: f32,
}

impl StateChange {
    pub fn new(state_hash: StateHash, normalized_time: f32) -> Self {
        StateChange {
            state_hash,
            normalized_time,
        }
    }

    /// Should a receiver ignore this message?
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.state_hash.is_sentinel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_slots() {
        let v = ParameterValue::Float(0.75);
        assert_eq!(v.float_slot(), 0.75);
        assert_eq!(v.int_slot(), 0);
        assert!(!v.bool_slot());

        let t = ParameterValue::Trigger(true);
        assert_eq!(t.kind(), ParameterKind::Trigger);
        assert!(t.bool_slot());
    }

    #[test]
    fn test_value_from_slots_selects_meaningful_field() {
        assert_eq!(
            ParameterValue::from_slots(ParameterKind::Int, 42, 9.5, true),
            ParameterValue::Int(42)
        );
        assert_eq!(
            ParameterValue::from_slots(ParameterKind::Float, 42, 9.5, true),
            ParameterValue::Float(9.5)
        );
        assert_eq!(
            ParameterValue::from_slots(ParameterKind::Trigger, 0, 0.0, true),
            ParameterValue::Trigger(true)
        );
    }

    #[test]
    fn test_snapshot_preserves_order() {
        let snapshot: ParameterSnapshot = vec![
            ParameterDescriptor::new("speed", ParameterValue::Float(1.0)),
            ParameterDescriptor::new("grounded", ParameterValue::Bool(true)),
        ]
        .into();

        let names: Vec<_> = snapshot.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["speed", "grounded"]);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_state_change_noop() {
        assert!(StateChange::new(StateHash::NONE, 0.3).is_noop());
        assert!(!StateChange::new(StateHash::new(7), 0.3).is_noop());
    }
}
