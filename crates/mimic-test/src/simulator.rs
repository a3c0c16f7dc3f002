//! Multi-peer session simulator
//!
//! Every peer runs the real runtime over a [`RecordingTransport`]. After each
//! frame the simulator collects what each peer sent, fans it out over one
//! [`ChaosLink`] per ordered peer pair, and feeds whatever the links deliver
//! to the receiving peers.

use std::collections::BTreeMap;
use std::time::Duration;

use mimic_core::{EntityId, MimicError, MimicResult, NodeId};
use mimic_runtime::{Peer, PeerConfig};
use mimic_state::MemoryBackend;
use mimic_transport::RecordingTransport;

use crate::chaos::{ChaosConfig, ChaosLink, ChaosStats};

/// Peer type driven by the simulator
pub type SimPeer = Peer<MemoryBackend, RecordingTransport>;

/// Non-fatal receive error seen during a run
#[derive(Clone, Debug, PartialEq)]
pub struct ReceiveError {
    pub at: Duration,
    pub node: NodeId,
    pub error: MimicError,
}

/// Deterministic session of peers over simulated links
pub struct SessionSimulator {
    peers: BTreeMap<NodeId, SimPeer>,
    links: BTreeMap<(NodeId, NodeId), ChaosLink>,
    link_config: ChaosConfig,
    peer_config: PeerConfig,
    seed: u64,
    now: Duration,
    errors: Vec<ReceiveError>,
}

impl SessionSimulator {
    pub fn new(link_config: ChaosConfig, seed: u64) -> Self {
        SessionSimulator {
            peers: BTreeMap::new(),
            links: BTreeMap::new(),
            link_config,
            peer_config: PeerConfig::default(),
            seed,
            now: Duration::ZERO,
            errors: Vec::new(),
        }
    }

    /// Loss-free, zero-latency session
    pub fn perfect() -> Self {
        Self::new(ChaosConfig::perfect(), 0)
    }

    /// Configuration used for peers added after this call
    pub fn with_peer_config(mut self, config: PeerConfig) -> Self {
        self.peer_config = config;
        self
    }

    /// Join a peer and open links to and from every existing peer
    pub fn add_peer(&mut self, node: NodeId) -> MimicResult<()> {
        let peer = Peer::with_config(node, RecordingTransport::new(), self.peer_config.clone())?;

        let others: Vec<NodeId> = self.peers.keys().copied().collect();
        for other in others {
            self.open_link(node, other);
            self.open_link(other, node);
        }
        self.peers.insert(node, peer);
        Ok(())
    }

    fn open_link(&mut self, from: NodeId, to: NodeId) {
        // Seed per direction so runs do not depend on join order
        let seed = self.seed ^ from.0.rotate_left(32) ^ to.0;
        self.links
            .insert((from, to), ChaosLink::new(self.link_config.clone(), seed));
    }

    /// Spawn `entity` on every peer. The owner binds `owner_backend`, every
    /// other peer binds a fresh backend from `mirror`.
    pub fn spawn(
        &mut self,
        entity: EntityId,
        owner: NodeId,
        owner_backend: MemoryBackend,
        mirror: impl Fn() -> MemoryBackend,
    ) -> MimicResult<()> {
        let mut owner_backend = Some(owner_backend);
        for (node, peer) in &mut self.peers {
            let backend = if *node == owner {
                owner_backend.take()
            } else {
                Some(mirror())
            };
            peer.spawn(entity, owner, backend)?;
        }
        Ok(())
    }

    /// Run one frame: tick every peer, ship frames, deliver arrivals.
    ///
    /// Configuration errors stop the run. Receive errors are recorded.
    pub fn step(&mut self, dt: Duration) -> MimicResult<()> {
        self.now += dt;

        for (node, peer) in &mut self.peers {
            peer.tick(dt)?;
            for sent in peer.transport_mut().take() {
                for ((from, _), link) in self.links.iter_mut() {
                    if from == node {
                        link.send(sent.frame.clone());
                    }
                }
            }
        }

        // Links iterate in (from, to) order, so delivery order is reproducible
        let mut arrivals = Vec::new();
        for ((_, to), link) in self.links.iter_mut() {
            arrivals.extend(link.tick(dt).into_iter().map(|frame| (*to, frame)));
        }

        for (to, frame) in arrivals {
            let Some(peer) = self.peers.get_mut(&to) else {
                continue;
            };
            if let Err(error) = peer.receive(&frame) {
                if error.is_fatal() {
                    return Err(error);
                }
                tracing::debug!(node = %to, error = %error, "receive failed");
                self.errors.push(ReceiveError {
                    at: self.now,
                    node: to,
                    error,
                });
            }
        }

        Ok(())
    }

    /// Step at a fixed frame time until `duration` has passed
    pub fn run(&mut self, duration: Duration, frame: Duration) -> MimicResult<()> {
        let end = self.now + duration;
        while self.now < end {
            self.step(frame)?;
        }
        Ok(())
    }

    /// Change one direction of one link
    pub fn set_link_config(&mut self, from: NodeId, to: NodeId, config: ChaosConfig) {
        if let Some(link) = self.links.get_mut(&(from, to)) {
            link.set_config(config);
        }
    }

    pub fn peer(&self, node: NodeId) -> Option<&SimPeer> {
        self.peers.get(&node)
    }

    pub fn peer_mut(&mut self, node: NodeId) -> Option<&mut SimPeer> {
        self.peers.get_mut(&node)
    }

    pub fn peers(&self) -> impl Iterator<Item = (NodeId, &SimPeer)> {
        self.peers.iter().map(|(node, peer)| (*node, peer))
    }

    pub fn backend(&self, node: NodeId, entity: EntityId) -> Option<&MemoryBackend> {
        self.peers.get(&node)?.backend(entity)
    }

    pub fn backend_mut(&mut self, node: NodeId, entity: EntityId) -> Option<&mut MemoryBackend> {
        self.peers.get_mut(&node)?.backend_mut(entity)
    }

    pub fn link_stats(&self, from: NodeId, to: NodeId) -> Option<&ChaosStats> {
        self.links.get(&(from, to)).map(ChaosLink::stats)
    }

    pub fn errors(&self) -> &[ReceiveError] {
        &self.errors
    }

    pub fn now(&self) -> Duration {
        self.now
    }
}
