//! Message encoder
//!
//! Parameter snapshots are built every sampling tick. State changes are
//! built only when the detector fires, from a fresh backend query rather
//! than from anything the detector remembered.

use mimic_core::{
    MimicError, MimicResult, ParameterDescriptor, ParameterKind, ParameterSnapshot,
    ParameterValue, StateChange,
};

use crate::{AnimationBackend, RawParameter, SnapshotReader};

/// Builds replicated messages from backend samples
pub struct AnimationEncoder;

impl AnimationEncoder {
    /// Turn raw samples into a typed snapshot.
    ///
    /// An unknown kind code means the animation definition and the codec
    /// disagree: no snapshot is produced.
    pub fn encode_parameters(raw: &[RawParameter]) -> MimicResult<ParameterSnapshot> {
        let mut snapshot = ParameterSnapshot::with_capacity(raw.len());

        for parameter in raw {
            let Some(kind) = ParameterKind::from_code(parameter.kind_code) else {
                tracing::error!(
                    parameter = %parameter.name,
                    kind = parameter.kind_code,
                    "unrecognized animation parameter kind"
                );
                return Err(MimicError::UnknownParameterKind(parameter.kind_code));
            };

            let value = ParameterValue::from_slots(
                kind,
                parameter.int,
                parameter.float,
                parameter.boolean,
            );
            snapshot.push(ParameterDescriptor::new(parameter.name.clone(), value));
        }

        Ok(snapshot)
    }

    /// Sample and encode the backend's parameters
    pub fn sample_parameters<B: AnimationBackend + ?Sized>(
        backend: &B,
    ) -> MimicResult<ParameterSnapshot> {
        Self::encode_parameters(&SnapshotReader::read_parameters(backend))
    }

    /// Build a state message from a live query: the transition target and
    /// its progress while blending, the current state otherwise
    pub fn encode_state<B: AnimationBackend + ?Sized>(backend: &B) -> StateChange {
        let target = SnapshotReader::read_motion(backend).target();
        StateChange::new(target.hash, target.normalized_time)
    }
}
