//! Animation backend capability
//!
//! The replication core never evaluates animation graphs. It talks to the
//! engine through this trait, implemented once per target engine.

use mimic_core::{StateHash, TransitionHash};

/// A parameter as declared by the engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Engine type code (1 float, 3 int, 4 bool, 9 trigger)
    pub kind_code: i32,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, kind_code: i32) -> Self {
        ParameterInfo {
            name: name.into(),
            kind_code,
        }
    }
}

/// Identifying hash and progress of a state
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StateInfo {
    pub hash: StateHash,
    /// Normalized progress, nominally [0, 1)
    pub normalized_time: f32,
}

impl StateInfo {
    pub fn new(hash: StateHash, normalized_time: f32) -> Self {
        StateInfo {
            hash,
            normalized_time,
        }
    }
}

/// Single-layer animation engine as seen by the replication core
pub trait AnimationBackend {
    /// Declared parameters in declaration order
    fn parameters(&self) -> Vec<ParameterInfo>;

    /// Number of declared parameters
    fn parameter_count(&self) -> usize {
        self.parameters().len()
    }

    fn get_float(&self, name: &str) -> f32;
    fn get_int(&self, name: &str) -> i64;
    fn get_bool(&self, name: &str) -> bool;

    fn set_float(&mut self, name: &str, value: f32);
    fn set_int(&mut self, name: &str, value: i64);
    fn set_bool(&mut self, name: &str, value: bool);
    fn set_trigger(&mut self, name: &str);

    /// Is the graph currently blending between two states?
    fn is_in_transition(&self) -> bool;

    /// Hash of the active transition. Only meaningful while in transition.
    fn transition_hash(&self) -> TransitionHash;

    /// State the graph is in (or leaving, while in transition)
    fn current_state(&self) -> StateInfo;

    /// State the active transition leads to. Only meaningful while in transition.
    fn next_state(&self) -> StateInfo;

    /// Jump to `state` at `normalized_time` without blending
    fn play(&mut self, state: StateHash, normalized_time: f32);
}

impl<B: AnimationBackend + ?Sized> AnimationBackend for Box<B> {
    fn parameters(&self) -> Vec<ParameterInfo> {
        (**self).parameters()
    }

    fn parameter_count(&self) -> usize {
        (**self).parameter_count()
    }

    fn get_float(&self, name: &str) -> f32 {
        (**self).get_float(name)
    }

    fn get_int(&self, name: &str) -> i64 {
        (**self).get_int(name)
    }

    fn get_bool(&self, name: &str) -> bool {
        (**self).get_bool(name)
    }

    fn set_float(&mut self, name: &str, value: f32) {
        (**self).set_float(name, value)
    }

    fn set_int(&mut self, name: &str, value: i64) {
        (**self).set_int(name, value)
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        (**self).set_bool(name, value)
    }

    fn set_trigger(&mut self, name: &str) {
        (**self).set_trigger(name)
    }

    fn is_in_transition(&self) -> bool {
        (**self).is_in_transition()
    }

    fn transition_hash(&self) -> TransitionHash {
        (**self).transition_hash()
    }

    fn current_state(&self) -> StateInfo {
        (**self).current_state()
    }

    fn next_state(&self) -> StateInfo {
        (**self).next_state()
    }

    fn play(&mut self, state: StateHash, normalized_time: f32) {
        (**self).play(state, normalized_time)
    }
}
