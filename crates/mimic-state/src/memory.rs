//! In-memory animation backend
//!
//! Holds parameter values and a scripted state/transition position. Used by
//! hosts without an engine (headless servers, tools) and by tests.

use mimic_core::{ParameterKind, StateHash, TransitionHash};

use crate::{AnimationBackend, ParameterInfo, StateInfo};

/// Stored parameter. All three scalar slots exist regardless of kind,
/// matching how engines expose typed getters on untyped storage.
#[derive(Clone, Debug, PartialEq)]
struct MemoryParameter {
    name: String,
    kind_code: i32,
    float: f32,
    int: i64,
    boolean: bool,
}

/// Where the graph currently is
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    Settled(StateInfo),
    Transitioning {
        transition: TransitionHash,
        current: StateInfo,
        next: StateInfo,
    },
}

/// Scriptable in-memory backend
#[derive(Clone, Debug)]
pub struct MemoryBackend {
    parameters: Vec<MemoryParameter>,
    motion: Motion,
    /// Every `play` call, in order
    plays: Vec<StateInfo>,
    /// Setter and `play` calls since creation
    mutations: u64,
}

impl MemoryBackend {
    /// Backend settled in the sentinel state with no parameters
    pub fn new() -> Self {
        MemoryBackend {
            parameters: Vec::new(),
            motion: Motion::Settled(StateInfo::default()),
            plays: Vec::new(),
            mutations: 0,
        }
    }

    /// Backend settled in `state`
    pub fn settled_in(state: StateHash) -> Self {
        let mut backend = Self::new();
        backend.motion = Motion::Settled(StateInfo::new(state, 0.0));
        backend
    }

    pub fn with_float(self, name: &str, value: f32) -> Self {
        self.with_parameter(name, ParameterKind::Float.code(), |p| p.float = value)
    }

    pub fn with_int(self, name: &str, value: i64) -> Self {
        self.with_parameter(name, ParameterKind::Int.code(), |p| p.int = value)
    }

    pub fn with_bool(self, name: &str, value: bool) -> Self {
        self.with_parameter(name, ParameterKind::Bool.code(), |p| p.boolean = value)
    }

    pub fn with_trigger(self, name: &str) -> Self {
        self.with_parameter(name, ParameterKind::Trigger.code(), |_| {})
    }

    /// Declare a parameter with an arbitrary engine type code
    pub fn with_raw_parameter(self, name: &str, kind_code: i32) -> Self {
        self.with_parameter(name, kind_code, |_| {})
    }

    fn with_parameter(
        mut self,
        name: &str,
        kind_code: i32,
        init: impl FnOnce(&mut MemoryParameter),
    ) -> Self {
        let mut parameter = MemoryParameter {
            name: name.to_owned(),
            kind_code,
            float: 0.0,
            int: 0,
            boolean: false,
        };
        init(&mut parameter);
        self.parameters.push(parameter);
        self
    }

    /// Settle into `state` at `normalized_time` (engine-side, not a replicated mutation)
    pub fn settle(&mut self, state: StateHash, normalized_time: f32) {
        self.motion = Motion::Settled(StateInfo::new(state, normalized_time));
    }

    /// Start blending from the current state towards `next`
    pub fn begin_transition(&mut self, transition: TransitionHash, next: StateInfo) {
        let current = match self.motion {
            Motion::Settled(current) => current,
            Motion::Transitioning { next, .. } => next,
        };
        self.motion = Motion::Transitioning {
            transition,
            current,
            next,
        };
    }

    /// Advance progress of whatever the graph is doing
    pub fn set_progress(&mut self, normalized_time: f32) {
        match &mut self.motion {
            Motion::Settled(state) => state.normalized_time = normalized_time,
            Motion::Transitioning { next, .. } => next.normalized_time = normalized_time,
        }
    }

    /// Finish the active transition, settling in its target
    pub fn complete_transition(&mut self) {
        if let Motion::Transitioning { next, .. } = self.motion {
            self.motion = Motion::Settled(next);
        }
    }

    /// Engine consumed a trigger; returns whether it was armed
    pub fn consume_trigger(&mut self, name: &str) -> bool {
        match self.find_mut(name) {
            Some(p) => std::mem::replace(&mut p.boolean, false),
            None => false,
        }
    }

    /// Arm a trigger locally without counting a replicated mutation
    pub fn arm_trigger(&mut self, name: &str) {
        if let Some(p) = self.find_mut(name) {
            p.boolean = true;
        }
    }

    /// Change a parameter locally without counting a replicated mutation
    pub fn drive_float(&mut self, name: &str, value: f32) {
        if let Some(p) = self.find_mut(name) {
            p.float = value;
        }
    }

    pub fn drive_int(&mut self, name: &str, value: i64) {
        if let Some(p) = self.find_mut(name) {
            p.int = value;
        }
    }

    pub fn drive_bool(&mut self, name: &str, value: bool) {
        if let Some(p) = self.find_mut(name) {
            p.boolean = value;
        }
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn plays(&self) -> &[StateInfo] {
        &self.plays
    }

    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    fn find(&self, name: &str) -> Option<&MemoryParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut MemoryParameter> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationBackend for MemoryBackend {
    fn parameters(&self) -> Vec<ParameterInfo> {
        self.parameters
            .iter()
            .map(|p| ParameterInfo::new(p.name.clone(), p.kind_code))
            .collect()
    }

    fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    fn get_float(&self, name: &str) -> f32 {
        self.find(name).map(|p| p.float).unwrap_or_default()
    }

    fn get_int(&self, name: &str) -> i64 {
        self.find(name).map(|p| p.int).unwrap_or_default()
    }

    fn get_bool(&self, name: &str) -> bool {
        self.find(name).map(|p| p.boolean).unwrap_or_default()
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.mutations += 1;
        if let Some(p) = self.find_mut(name) {
            p.float = value;
        }
    }

    fn set_int(&mut self, name: &str, value: i64) {
        self.mutations += 1;
        if let Some(p) = self.find_mut(name) {
            p.int = value;
        }
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.mutations += 1;
        if let Some(p) = self.find_mut(name) {
            p.boolean = value;
        }
    }

    fn set_trigger(&mut self, name: &str) {
        self.mutations += 1;
        if let Some(p) = self.find_mut(name) {
            p.boolean = true;
        }
    }

    fn is_in_transition(&self) -> bool {
        matches!(self.motion, Motion::Transitioning { .. })
    }

    fn transition_hash(&self) -> TransitionHash {
        match self.motion {
            Motion::Transitioning { transition, .. } => transition,
            Motion::Settled(_) => TransitionHash::default(),
        }
    }

    fn current_state(&self) -> StateInfo {
        match self.motion {
            Motion::Settled(current) | Motion::Transitioning { current, .. } => current,
        }
    }

    fn next_state(&self) -> StateInfo {
        match self.motion {
            Motion::Transitioning { next, .. } => next,
            Motion::Settled(_) => StateInfo::default(),
        }
    }

    fn play(&mut self, state: StateHash, normalized_time: f32) {
        self.mutations += 1;
        let info = StateInfo::new(state, normalized_time);
        self.plays.push(info);
        self.motion = Motion::Settled(info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_in_declaration_order() {
        let backend = MemoryBackend::new()
            .with_float("speed", 1.5)
            .with_int("combo", 2)
            .with_bool("grounded", true)
            .with_trigger("jump");

        let names: Vec<_> = backend.parameters().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["speed", "combo", "grounded", "jump"]);
        assert_eq!(backend.get_float("speed"), 1.5);
        assert_eq!(backend.get_int("combo"), 2);
        assert!(backend.get_bool("grounded"));
        assert!(!backend.get_bool("jump"));
    }

    #[test]
    fn test_transition_lifecycle() {
        let mut backend = MemoryBackend::settled_in(StateHash::new(10));
        assert!(!backend.is_in_transition());

        backend.begin_transition(TransitionHash::new(99), StateInfo::new(StateHash::new(20), 0.0));
        backend.set_progress(0.3);
        assert!(backend.is_in_transition());
        assert_eq!(backend.transition_hash(), TransitionHash::new(99));
        assert_eq!(backend.current_state().hash, StateHash::new(10));
        assert_eq!(backend.next_state(), StateInfo::new(StateHash::new(20), 0.3));

        backend.complete_transition();
        assert!(!backend.is_in_transition());
        assert_eq!(backend.current_state().hash, StateHash::new(20));
    }

    #[test]
    fn test_play_records_and_counts() {
        let mut backend = MemoryBackend::new();
        backend.play(StateHash::new(5), 0.25);

        assert_eq!(backend.plays(), &[StateInfo::new(StateHash::new(5), 0.25)]);
        assert_eq!(backend.mutations(), 1);
        assert_eq!(backend.current_state().hash, StateHash::new(5));
    }

    #[test]
    fn test_trigger_arm_and_consume() {
        let mut backend = MemoryBackend::new().with_trigger("jump");
        backend.set_trigger("jump");
        assert!(backend.get_bool("jump"));
        assert!(backend.consume_trigger("jump"));
        assert!(!backend.consume_trigger("jump"));
    }
}
