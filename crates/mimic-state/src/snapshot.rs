//! Snapshot reader - live queries against the animation backend

use mimic_core::TransitionHash;

use crate::{AnimationBackend, StateInfo};

/// A parameter as sampled from the backend, before kind validation.
///
/// Every typed accessor is queried; the kind code decides later which
/// reading is meaningful.
#[derive(Clone, Debug, PartialEq)]
pub struct RawParameter {
    pub name: String,
    pub kind_code: i32,
    pub float: f32,
    pub int: i64,
    pub boolean: bool,
}

/// Discrete position of the graph at sampling time
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionSample {
    Settled {
        current: StateInfo,
    },
    Transitioning {
        transition: TransitionHash,
        current: StateInfo,
        next: StateInfo,
    },
}

impl MotionSample {
    /// The state a receiver should end up in: the transition target while
    /// blending, the current state otherwise
    pub fn target(&self) -> StateInfo {
        match *self {
            MotionSample::Settled { current } => current,
            MotionSample::Transitioning { next, .. } => next,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self, MotionSample::Transitioning { .. })
    }
}

/// Reads parameters and motion straight from the backend. Never caches.
pub struct SnapshotReader;

impl SnapshotReader {
    /// Sample every declared parameter in declaration order
    pub fn read_parameters<B: AnimationBackend + ?Sized>(backend: &B) -> Vec<RawParameter> {
        backend
            .parameters()
            .into_iter()
            .map(|info| RawParameter {
                float: backend.get_float(&info.name),
                int: backend.get_int(&info.name),
                boolean: backend.get_bool(&info.name),
                name: info.name,
                kind_code: info.kind_code,
            })
            .collect()
    }

    /// Sample the state/transition position
    pub fn read_motion<B: AnimationBackend + ?Sized>(backend: &B) -> MotionSample {
        if backend.is_in_transition() {
            MotionSample::Transitioning {
                transition: backend.transition_hash(),
                current: backend.current_state(),
                next: backend.next_state(),
            }
        } else {
            MotionSample::Settled {
                current: backend.current_state(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;
    use mimic_core::StateHash;

    #[test]
    fn test_read_parameters_samples_all_slots() {
        let backend = MemoryBackend::new()
            .with_float("speed", 4.0)
            .with_bool("crouch", true);

        let raw = SnapshotReader::read_parameters(&backend);
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].name, "speed");
        assert_eq!(raw[0].kind_code, 1);
        assert_eq!(raw[0].float, 4.0);
        assert_eq!(raw[1].kind_code, 4);
        assert!(raw[1].boolean);
    }

    #[test]
    fn test_read_motion_is_live() {
        let mut backend = MemoryBackend::settled_in(StateHash::new(1));
        let first = SnapshotReader::read_motion(&backend);
        assert!(!first.is_transitioning());
        assert_eq!(first.target().hash, StateHash::new(1));

        backend.begin_transition(TransitionHash::new(3), StateInfo::new(StateHash::new(2), 0.1));
        let second = SnapshotReader::read_motion(&backend);
        assert!(second.is_transitioning());
        assert_eq!(second.target(), StateInfo::new(StateHash::new(2), 0.1));
    }
}
