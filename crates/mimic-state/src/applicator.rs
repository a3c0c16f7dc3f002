//! Remote applicator - mirrors received messages into the local backend

use mimic_core::{
    EntityId, MimicError, MimicResult, ParameterSnapshot, ParameterValue, StateChange,
};

use crate::{AnimationBackend, Authority};

/// Why a message left the backend untouched
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// This peer owns the entity; applying would clobber the source of truth
    LocallyAuthoritative,
    /// `state_hash == 0`
    SentinelState,
    /// No animation backend bound to the entity yet
    NoBackend,
}

/// Result of applying one message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// `count` parameters set, or one state played
    Applied { count: usize },
    Skipped(SkipReason),
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

/// Applies parameter snapshots and state changes on observing peers
pub struct RemoteApplicator;

impl RemoteApplicator {
    /// Set each received parameter through the matching typed setter.
    ///
    /// Entries are correlated by position with the local declaration. When
    /// the counts differ only the common prefix is applied and the mismatch
    /// is returned as [`MimicError::CardinalityMismatch`].
    ///
    /// Triggers fire only when the received entry is armed; an unarmed
    /// trigger entry leaves the backend untouched.
    pub fn apply_parameters<B, A>(
        backend: &mut B,
        entity: EntityId,
        authority: &A,
        snapshot: &ParameterSnapshot,
    ) -> MimicResult<ApplyOutcome>
    where
        B: AnimationBackend + ?Sized,
        A: Authority + ?Sized,
    {
        if authority.is_locally_authoritative(entity) {
            return Ok(ApplyOutcome::Skipped(SkipReason::LocallyAuthoritative));
        }

        let local = backend.parameter_count();
        let received = snapshot.len();
        let count = local.min(received);

        for descriptor in &snapshot.descriptors()[..count] {
            let name = descriptor.name.as_str();
            match descriptor.value {
                ParameterValue::Float(v) => backend.set_float(name, v),
                ParameterValue::Int(v) => backend.set_int(name, v),
                ParameterValue::Bool(v) => backend.set_bool(name, v),
                ParameterValue::Trigger(true) => backend.set_trigger(name),
                ParameterValue::Trigger(false) => {}
            }
        }

        if local != received {
            tracing::warn!(
                entity = %entity,
                local,
                received,
                "parameter count mismatch, applied common prefix"
            );
            return Err(MimicError::CardinalityMismatch { local, received });
        }

        Ok(ApplyOutcome::Applied { count })
    }

    /// Snap the backend to the received state
    pub fn apply_state<B, A>(
        backend: &mut B,
        entity: EntityId,
        authority: &A,
        change: &StateChange,
    ) -> ApplyOutcome
    where
        B: AnimationBackend + ?Sized,
        A: Authority + ?Sized,
    {
        if authority.is_locally_authoritative(entity) {
            return ApplyOutcome::Skipped(SkipReason::LocallyAuthoritative);
        }
        if change.is_noop() {
            tracing::trace!(entity = %entity, "ignoring sentinel state change");
            return ApplyOutcome::Skipped(SkipReason::SentinelState);
        }

        tracing::debug!(
            entity = %entity,
            state = %change.state_hash,
            normalized_time = change.normalized_time,
            "applying state change"
        );
        backend.play(change.state_hash, change.normalized_time);
        ApplyOutcome::Applied { count: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnimationEncoder, MemoryBackend, StateInfo};
    use mimic_core::{ParameterDescriptor, StateHash};
    use proptest::prelude::*;

    struct Fixed(bool);

    impl Authority for Fixed {
        fn is_locally_authoritative(&self, _entity: EntityId) -> bool {
            self.0
        }
    }

    const REMOTE: Fixed = Fixed(false);
    const OWNER: Fixed = Fixed(true);

    fn rig() -> MemoryBackend {
        MemoryBackend::new()
            .with_float("speed", 0.0)
            .with_int("weapon", 0)
            .with_bool("grounded", false)
            .with_trigger("jump")
    }

    #[test]
    fn test_parameter_roundtrip() {
        let mut sender = rig();
        sender.drive_float("speed", 5.5);
        sender.drive_int("weapon", 2);
        sender.drive_bool("grounded", true);
        sender.arm_trigger("jump");

        let snapshot = AnimationEncoder::sample_parameters(&sender).unwrap();
        let mut receiver = rig();
        let outcome =
            RemoteApplicator::apply_parameters(&mut receiver, EntityId::new(1), &REMOTE, &snapshot)
                .unwrap();

        assert_eq!(outcome, ApplyOutcome::Applied { count: 4 });
        assert_eq!(receiver.get_float("speed"), 5.5);
        assert_eq!(receiver.get_int("weapon"), 2);
        assert!(receiver.get_bool("grounded"));
        assert!(receiver.get_bool("jump"));
    }

    #[test]
    fn test_unarmed_trigger_not_fired() {
        let snapshot: ParameterSnapshot =
            vec![ParameterDescriptor::new("jump", ParameterValue::Trigger(false))].into();
        let mut receiver = MemoryBackend::new().with_trigger("jump");

        RemoteApplicator::apply_parameters(&mut receiver, EntityId::new(1), &REMOTE, &snapshot)
            .unwrap();
        assert_eq!(receiver.mutations(), 0);
    }

    #[test]
    fn test_owner_never_mutated() {
        let snapshot = AnimationEncoder::sample_parameters(&rig()).unwrap();
        let mut backend = rig();

        let outcome =
            RemoteApplicator::apply_parameters(&mut backend, EntityId::new(1), &OWNER, &snapshot)
                .unwrap();
        assert_eq!(outcome, ApplyOutcome::Skipped(SkipReason::LocallyAuthoritative));

        let outcome = RemoteApplicator::apply_state(
            &mut backend,
            EntityId::new(1),
            &OWNER,
            &StateChange::new(StateHash::new(9), 0.0),
        );
        assert_eq!(outcome, ApplyOutcome::Skipped(SkipReason::LocallyAuthoritative));
        assert_eq!(backend.mutations(), 0);
    }

    #[test]
    fn test_sentinel_state_ignored() {
        let mut backend = MemoryBackend::settled_in(StateHash::new(3));
        let outcome = RemoteApplicator::apply_state(
            &mut backend,
            EntityId::new(1),
            &REMOTE,
            &StateChange::new(StateHash::NONE, 0.5),
        );

        assert_eq!(outcome, ApplyOutcome::Skipped(SkipReason::SentinelState));
        assert_eq!(backend.mutations(), 0);
        assert_eq!(backend.current_state().hash, StateHash::new(3));
    }

    #[test]
    fn test_state_hard_snap() {
        let mut backend = MemoryBackend::settled_in(StateHash::new(3));
        let outcome = RemoteApplicator::apply_state(
            &mut backend,
            EntityId::new(1),
            &REMOTE,
            &StateChange::new(StateHash::new(4), 0.7),
        );

        assert!(outcome.is_applied());
        assert_eq!(backend.plays(), &[StateInfo::new(StateHash::new(4), 0.7)]);
    }

    #[test]
    fn test_excess_parameters_reported() {
        let snapshot: ParameterSnapshot = vec![
            ParameterDescriptor::new("a", ParameterValue::Float(1.0)),
            ParameterDescriptor::new("b", ParameterValue::Float(2.0)),
            ParameterDescriptor::new("c", ParameterValue::Float(3.0)),
        ]
        .into();
        let mut receiver = MemoryBackend::new().with_float("a", 0.0).with_float("b", 0.0);

        let err =
            RemoteApplicator::apply_parameters(&mut receiver, EntityId::new(1), &REMOTE, &snapshot)
                .unwrap_err();

        assert_eq!(err, MimicError::CardinalityMismatch { local: 2, received: 3 });
        assert_eq!(receiver.get_float("a"), 1.0);
        assert_eq!(receiver.get_float("b"), 2.0);
        assert_eq!(receiver.mutations(), 2);
    }

    #[test]
    fn test_short_snapshot_reported() {
        let snapshot: ParameterSnapshot =
            vec![ParameterDescriptor::new("a", ParameterValue::Int(8))].into();
        let mut receiver = MemoryBackend::new().with_int("a", 0).with_int("b", 0);

        let err =
            RemoteApplicator::apply_parameters(&mut receiver, EntityId::new(1), &REMOTE, &snapshot)
                .unwrap_err();

        assert_eq!(err, MimicError::CardinalityMismatch { local: 2, received: 1 });
        assert_eq!(receiver.get_int("a"), 8);
    }

    proptest! {
        #[test]
        fn prop_parameter_roundtrip(
            speed in proptest::num::f32::NORMAL,
            weapon in any::<i64>(),
            grounded in any::<bool>(),
            jump in any::<bool>(),
        ) {
            let mut sender = rig();
            sender.drive_float("speed", speed);
            sender.drive_int("weapon", weapon);
            sender.drive_bool("grounded", grounded);
            if jump {
                sender.arm_trigger("jump");
            }

            let snapshot = AnimationEncoder::sample_parameters(&sender).unwrap();
            let mut receiver = rig();
            RemoteApplicator::apply_parameters(&mut receiver, EntityId::new(1), &REMOTE, &snapshot)
                .unwrap();

            for name in ["speed", "weapon", "grounded", "jump"] {
                prop_assert_eq!(receiver.get_float(name), sender.get_float(name));
                prop_assert_eq!(receiver.get_int(name), sender.get_int(name));
                prop_assert_eq!(receiver.get_bool(name), sender.get_bool(name));
            }
        }
    }
}
