//! Change detector - decides when a state message is worth sending
//!
//! State machine over the graph's discrete position:
//!
//! ```text
//!              settled s                    in transition t
//! Unsampled ─────────────▶ Settled(s) ◀──────────────────▶ Transitioning(t)
//!                          │  ▲  settled s' != s                │  ▲
//!                          └──┘                                 └──┘ t' != t
//! ```
//!
//! Every edge reports a change; staying on the same hash does not.

use mimic_core::{StateHash, TransitionHash};

use crate::MotionSample;

/// Detector memory
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectorState {
    /// Nothing observed since creation or the last reset
    #[default]
    Unsampled,
    /// Last observed settled in this state
    Settled(StateHash),
    /// Last observed inside this transition
    Transitioning(TransitionHash),
}

/// Outcome of one observation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Unchanged,
    /// A new transition started
    EnteredTransition(TransitionHash),
    /// Settled in a new state. `from_settled` is set when the previous
    /// observation was a different settled state, with no transition seen
    /// in between.
    Settled {
        state: StateHash,
        from_settled: bool,
    },
}

impl Verdict {
    #[inline]
    pub fn is_changed(&self) -> bool {
        !matches!(self, Verdict::Unchanged)
    }
}

/// Per-entity change detector, owned by the authoritative peer
#[derive(Clone, Debug, Default)]
pub struct ChangeDetector {
    state: DetectorState,
}

impl ChangeDetector {
    pub fn new() -> Self {
        ChangeDetector::default()
    }

    /// Compare `sample` against memory and update it
    pub fn observe(&mut self, sample: &MotionSample) -> Verdict {
        match *sample {
            MotionSample::Transitioning { transition, .. } => {
                if self.state == DetectorState::Transitioning(transition) {
                    return Verdict::Unchanged;
                }
                self.state = DetectorState::Transitioning(transition);
                Verdict::EnteredTransition(transition)
            }
            MotionSample::Settled { current } => {
                if self.state == DetectorState::Settled(current.hash) {
                    return Verdict::Unchanged;
                }
                let from_settled = matches!(self.state, DetectorState::Settled(_));
                self.state = DetectorState::Settled(current.hash);
                Verdict::Settled {
                    state: current.hash,
                    from_settled,
                }
            }
        }
    }

    /// Forget everything; the next observation reports a change
    pub fn reset(&mut self) {
        self.state = DetectorState::Unsampled;
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateInfo;

    fn settled(hash: i32) -> MotionSample {
        MotionSample::Settled {
            current: StateInfo::new(StateHash::new(hash), 0.0),
        }
    }

    fn transitioning(transition: i32, target: i32) -> MotionSample {
        MotionSample::Transitioning {
            transition: TransitionHash::new(transition),
            current: StateInfo::new(StateHash::new(1), 0.9),
            next: StateInfo::new(StateHash::new(target), 0.1),
        }
    }

    #[test]
    fn test_first_observation_always_changes() {
        let mut detector = ChangeDetector::new();
        assert_eq!(
            detector.observe(&settled(42)),
            Verdict::Settled {
                state: StateHash::new(42),
                from_settled: false
            }
        );

        let mut detector = ChangeDetector::new();
        assert!(detector.observe(&transitioning(7, 2)).is_changed());
    }

    #[test]
    fn test_zero_hash_is_not_swallowed() {
        let mut detector = ChangeDetector::new();
        assert!(detector.observe(&settled(0)).is_changed());
        assert!(!detector.observe(&settled(0)).is_changed());

        let mut detector = ChangeDetector::new();
        assert!(detector.observe(&transitioning(0, 5)).is_changed());
    }

    #[test]
    fn test_identical_samples_unchanged() {
        let mut detector = ChangeDetector::new();
        detector.observe(&settled(42));
        assert_eq!(detector.observe(&settled(42)), Verdict::Unchanged);

        detector.observe(&transitioning(9, 43));
        assert_eq!(detector.observe(&transitioning(9, 43)), Verdict::Unchanged);
    }

    #[test]
    fn test_transition_then_settle() {
        let mut detector = ChangeDetector::new();
        detector.observe(&settled(1));

        assert_eq!(
            detector.observe(&transitioning(9, 2)),
            Verdict::EnteredTransition(TransitionHash::new(9))
        );
        assert_eq!(detector.state(), DetectorState::Transitioning(TransitionHash::new(9)));

        assert_eq!(
            detector.observe(&settled(2)),
            Verdict::Settled {
                state: StateHash::new(2),
                from_settled: false
            }
        );
    }

    #[test]
    fn test_direct_state_jump() {
        let mut detector = ChangeDetector::new();
        detector.observe(&settled(1));
        assert_eq!(
            detector.observe(&settled(2)),
            Verdict::Settled {
                state: StateHash::new(2),
                from_settled: true
            }
        );
    }

    #[test]
    fn test_chained_transitions() {
        let mut detector = ChangeDetector::new();
        detector.observe(&transitioning(9, 2));
        assert!(detector.observe(&transitioning(10, 3)).is_changed());
    }

    #[test]
    fn test_reset() {
        let mut detector = ChangeDetector::new();
        detector.observe(&settled(5));
        detector.reset();
        assert_eq!(detector.state(), DetectorState::Unsampled);
        assert!(detector.observe(&settled(5)).is_changed());
    }
}
