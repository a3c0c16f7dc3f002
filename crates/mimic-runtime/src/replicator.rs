//! Per-entity animation replicator

use std::time::Duration;

use mimic_core::{EntityId, MimicError, MimicResult};
use mimic_state::{
    AnimationBackend, AnimationEncoder, ApplyOutcome, Authority, ChangeDetector, RateLimiter,
    RemoteApplicator, SkipReason, SnapshotReader, Verdict,
};
use mimic_transport::{Dispatcher, Transport};
use mimic_wire::{Envelope, Payload};

use crate::ReplicationConfig;

/// What one `update` call did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// The rate limiter allowed a sampling pass
    pub sampled: bool,
    pub parameters_sent: bool,
    /// A change-driven state message went out
    pub state_sent: bool,
    /// A periodic state refresh went out
    pub refresh_sent: bool,
    /// Sends the transport refused
    pub dispatch_failures: u32,
}

/// Binds one entity to its animation backend and replicates it.
///
/// On the owning peer `update` samples and sends; on every other peer
/// `handle` applies what arrives. A replicator without a backend does nothing.
pub struct AnimatorReplicator<B> {
    entity: EntityId,
    backend: Option<B>,
    limiter: RateLimiter,
    detector: ChangeDetector,
    parameters_reliable: bool,
    state_reliable: bool,
    refresh_interval: Option<Duration>,
    /// Time since the last state message, for refresh
    since_state: Duration,
}

impl<B: AnimationBackend> AnimatorReplicator<B> {
    pub fn new(entity: EntityId, config: &ReplicationConfig) -> MimicResult<Self> {
        config.validate()?;
        Ok(AnimatorReplicator {
            entity,
            backend: None,
            limiter: RateLimiter::new(config.updates_per_second)?,
            detector: ChangeDetector::new(),
            parameters_reliable: config.parameters_reliable,
            state_reliable: config.state_reliable,
            refresh_interval: config.state_refresh_interval()?,
            since_state: Duration::ZERO,
        })
    }

    pub fn with_backend(mut self, backend: B) -> Self {
        self.attach_backend(backend);
        self
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Bind a backend, replacing any previous one. The next sampling pass
    /// happens on the next update and always reports a state change.
    pub fn attach_backend(&mut self, backend: B) -> Option<B> {
        self.reset();
        self.backend.replace(backend)
    }

    pub fn detach_backend(&mut self) -> Option<B> {
        self.reset();
        self.backend.take()
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    /// Forget sampling history, e.g. after an ownership change
    pub fn reset(&mut self) {
        self.limiter.reset();
        self.detector.reset();
        self.since_state = Duration::ZERO;
    }

    /// Sender path. Call once per frame with the frame's elapsed time.
    ///
    /// Configuration errors abort the pass and are returned. Transport
    /// failures are logged and counted in the report.
    pub fn update<A, T>(
        &mut self,
        dt: Duration,
        authority: &A,
        dispatcher: &mut Dispatcher<T>,
    ) -> MimicResult<TickReport>
    where
        A: Authority + ?Sized,
        T: Transport,
    {
        let mut report = TickReport::default();

        let Some(backend) = self.backend.as_ref() else {
            return Ok(report);
        };
        if !authority.is_locally_authoritative(self.entity) {
            return Ok(report);
        }

        self.since_state = self.since_state.saturating_add(dt);
        if !self.limiter.tick(dt) {
            return Ok(report);
        }
        report.sampled = true;
        tracing::trace!(entity = %self.entity, "sampling animation");

        let snapshot = AnimationEncoder::sample_parameters(backend)?;
        let envelope = Envelope::parameters(self.entity, snapshot)
            .with_reliable(self.parameters_reliable);
        report.parameters_sent = send(dispatcher, &envelope, &mut report)?;

        let verdict = self.detector.observe(&SnapshotReader::read_motion(backend));
        let refresh_due = self
            .refresh_interval
            .is_some_and(|interval| self.since_state >= interval);

        if !verdict.is_changed() && !refresh_due {
            return Ok(report);
        }

        let change = AnimationEncoder::encode_state(backend);
        match verdict {
            Verdict::Unchanged => {}
            Verdict::EnteredTransition(transition) => tracing::debug!(
                entity = %self.entity,
                ?transition,
                target = %change.state_hash,
                "transition started"
            ),
            Verdict::Settled { state, from_settled } => tracing::debug!(
                entity = %self.entity,
                state = %state,
                from_settled,
                "state settled"
            ),
        }

        let envelope = Envelope::state(self.entity, change)
            .with_reliable(self.state_reliable)
            .with_refresh(!verdict.is_changed());
        let sent = send(dispatcher, &envelope, &mut report)?;
        if verdict.is_changed() {
            report.state_sent = sent;
        } else {
            report.refresh_sent = sent;
        }
        self.since_state = Duration::ZERO;

        Ok(report)
    }

    /// Receiver path for one envelope addressed to this entity
    pub fn handle<A>(&mut self, envelope: &Envelope, authority: &A) -> MimicResult<ApplyOutcome>
    where
        A: Authority + ?Sized,
    {
        if envelope.entity != self.entity {
            return Err(MimicError::EntityNotFound(envelope.entity));
        }
        let Some(backend) = self.backend.as_mut() else {
            return Ok(ApplyOutcome::Skipped(SkipReason::NoBackend));
        };

        match &envelope.payload {
            Payload::Parameters(snapshot) => {
                RemoteApplicator::apply_parameters(backend, self.entity, authority, snapshot)
            }
            Payload::State(change) => Ok(RemoteApplicator::apply_state(
                backend,
                self.entity,
                authority,
                change,
            )),
        }
    }
}

/// Hand one envelope to the dispatcher. Returns whether it went out.
fn send<T: Transport>(
    dispatcher: &mut Dispatcher<T>,
    envelope: &Envelope,
    report: &mut TickReport,
) -> MimicResult<bool> {
    match dispatcher.dispatch(envelope) {
        Ok(_) => Ok(true),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            tracing::warn!(
                entity = %envelope.entity,
                kind = ?envelope.kind(),
                error = %e,
                "dispatch failed"
            );
            report.dispatch_failures += 1;
            Ok(false)
        }
    }
}
