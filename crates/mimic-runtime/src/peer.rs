//! Mimic Peer - per-session entity registry and frame loop

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use mimic_core::{EntityId, MimicError, MimicResult, NodeId};
use mimic_state::{AnimationBackend, ApplyOutcome, OwnershipTable};
use mimic_transport::{Dispatcher, Transport};
use mimic_wire::Envelope;

use crate::{AnimatorReplicator, PeerConfig, TickReport};

#[derive(Clone, Debug, Default)]
pub struct PeerStats {
    pub ticks: u64,
    /// Sampling passes across all owned entities
    pub samples: u64,
    pub parameter_messages_sent: u64,
    pub state_messages_sent: u64,
    pub refresh_messages_sent: u64,
    pub envelopes_received: u64,
    pub envelopes_applied: u64,
    /// Parsed and routed, but skipped (authority, sentinel, no backend)
    pub envelopes_ignored: u64,
    pub cardinality_mismatches: u64,
    pub dispatch_failures: u64,
    pub unknown_entities: u64,
    pub last_tick_duration: Duration,
}

impl PeerStats {
    fn record(&mut self, report: &TickReport) {
        self.samples += u64::from(report.sampled);
        self.parameter_messages_sent += u64::from(report.parameters_sent);
        self.state_messages_sent += u64::from(report.state_sent);
        self.refresh_messages_sent += u64::from(report.refresh_sent);
        self.dispatch_failures += u64::from(report.dispatch_failures);
    }
}

/// One participant in a replication session
pub struct Peer<B, T> {
    config: PeerConfig,
    /// Who owns what, from this peer's point of view
    ownership: OwnershipTable,
    dispatcher: Dispatcher<T>,
    replicators: BTreeMap<EntityId, AnimatorReplicator<B>>,
    stats: PeerStats,
}

impl<B: AnimationBackend, T: Transport> Peer<B, T> {
    /// Create a peer with the default configuration
    pub fn new(node_id: NodeId, transport: T) -> Self {
        Peer {
            config: PeerConfig::default(),
            ownership: OwnershipTable::new(node_id),
            dispatcher: Dispatcher::new(transport),
            replicators: BTreeMap::new(),
            stats: PeerStats::default(),
        }
    }

    pub fn with_config(node_id: NodeId, transport: T, config: PeerConfig) -> MimicResult<Self> {
        config.validate()?;
        Ok(Peer {
            config,
            ..Self::new(node_id, transport)
        })
    }

    pub fn node_id(&self) -> NodeId {
        self.ownership.local()
    }

    pub fn config(&self) -> &PeerConfig {
        &self.config
    }

    /// Register an entity owned by `owner`. Replaces any existing
    /// registration for the same id.
    pub fn spawn(
        &mut self,
        entity: EntityId,
        owner: NodeId,
        backend: Option<B>,
    ) -> MimicResult<()> {
        let mut replicator = AnimatorReplicator::new(entity, &self.config.replication)?;
        if let Some(backend) = backend {
            replicator.attach_backend(backend);
        }

        self.ownership.assign(entity, owner);
        if self.replicators.insert(entity, replicator).is_some() {
            tracing::debug!(entity = %entity, "entity respawned");
        }
        tracing::debug!(
            entity = %entity,
            owner = %owner,
            local = %self.node_id(),
            "entity spawned"
        );
        Ok(())
    }

    /// Forget an entity, handing back its backend
    pub fn despawn(&mut self, entity: EntityId) -> Option<B> {
        self.ownership.release(entity);
        let mut replicator = self.replicators.remove(&entity)?;
        tracing::debug!(entity = %entity, "entity despawned");
        replicator.detach_backend()
    }

    /// Bind a backend to a spawned entity, returning the one it replaces
    pub fn attach_backend(&mut self, entity: EntityId, backend: B) -> MimicResult<Option<B>> {
        let replicator = self
            .replicators
            .get_mut(&entity)
            .ok_or(MimicError::EntityNotFound(entity))?;
        Ok(replicator.attach_backend(backend))
    }

    pub fn detach_backend(&mut self, entity: EntityId) -> Option<B> {
        self.replicators.get_mut(&entity)?.detach_backend()
    }

    pub fn backend(&self, entity: EntityId) -> Option<&B> {
        self.replicators.get(&entity)?.backend()
    }

    pub fn backend_mut(&mut self, entity: EntityId) -> Option<&mut B> {
        self.replicators.get_mut(&entity)?.backend_mut()
    }

    pub fn replicator(&self, entity: EntityId) -> Option<&AnimatorReplicator<B>> {
        self.replicators.get(&entity)
    }

    /// Spawned entities, in id order
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.replicators.keys().copied()
    }

    pub fn owner(&self, entity: EntityId) -> Option<NodeId> {
        self.ownership.owner(entity)
    }

    /// Move authority over an entity. The entity's sampling history is
    /// reset so a new owner starts with a full state message.
    pub fn transfer_ownership(&mut self, entity: EntityId, owner: NodeId) -> MimicResult<()> {
        let replicator = self
            .replicators
            .get_mut(&entity)
            .ok_or(MimicError::EntityNotFound(entity))?;
        replicator.reset();
        self.ownership.assign(entity, owner);
        tracing::debug!(entity = %entity, owner = %owner, "ownership transferred");
        Ok(())
    }

    /// Run one frame of the sender path for every entity.
    ///
    /// Stops at the first configuration error and returns it.
    pub fn tick(&mut self, dt: Duration) -> MimicResult<()> {
        let start = Instant::now();
        self.stats.ticks += 1;

        let result = self.update_replicators(dt);

        self.stats.last_tick_duration = start.elapsed();
        result
    }

    fn update_replicators(&mut self, dt: Duration) -> MimicResult<()> {
        for replicator in self.replicators.values_mut() {
            let report = replicator.update(dt, &self.ownership, &mut self.dispatcher)?;
            self.stats.record(&report);
        }
        Ok(())
    }

    /// Receiver path for one inbound frame.
    ///
    /// Returns `Ok(None)` when the frame addresses an entity this peer does
    /// not know. Malformed frames and cardinality mismatches are errors.
    pub fn receive(&mut self, frame: &[u8]) -> MimicResult<Option<ApplyOutcome>> {
        self.stats.envelopes_received += 1;
        let envelope = Envelope::parse(frame)?;

        let Some(replicator) = self.replicators.get_mut(&envelope.entity) else {
            tracing::debug!(entity = %envelope.entity, "dropping envelope for unknown entity");
            self.stats.unknown_entities += 1;
            return Ok(None);
        };

        match replicator.handle(&envelope, &self.ownership) {
            Ok(outcome) => {
                if outcome.is_applied() {
                    self.stats.envelopes_applied += 1;
                } else {
                    self.stats.envelopes_ignored += 1;
                }
                Ok(Some(outcome))
            }
            Err(e) => {
                if matches!(e, MimicError::CardinalityMismatch { .. }) {
                    self.stats.cardinality_mismatches += 1;
                }
                Err(e)
            }
        }
    }

    pub fn stats(&self) -> &PeerStats {
        &self.stats
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.dispatcher.transport_mut()
    }
}
