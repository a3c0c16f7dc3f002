//! In-process loopback transport
//!
//! Every peer attached to a [`LoopbackHub`] gets an inbox. A send from one
//! peer lands in the inbox of every other peer, like a broadcast on a P2P
//! mesh. Nothing is dropped or reordered here; lossy links are simulated
//! elsewhere.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use mimic_core::{EntityId, MimicError, MimicResult, NodeId};

use crate::Transport;

/// A frame waiting in a peer's inbox
#[derive(Clone, Debug, PartialEq)]
pub struct Delivery {
    pub from: NodeId,
    pub entity: EntityId,
    pub frame: Bytes,
    pub reliable: bool,
}

/// Shared mailbox set
#[derive(Clone, Default)]
pub struct LoopbackHub {
    inboxes: Arc<Mutex<HashMap<NodeId, VecDeque<Delivery>>>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        LoopbackHub::default()
    }

    /// Attach a peer and return its transport
    pub fn attach(&self, node: NodeId) -> LoopbackTransport {
        self.inboxes.lock().entry(node).or_default();
        LoopbackTransport {
            local: node,
            hub: self.clone(),
        }
    }

    /// Detach a peer; frames still in its inbox are discarded
    pub fn detach(&self, node: NodeId) {
        self.inboxes.lock().remove(&node);
    }

    /// Number of frames waiting for `node`
    pub fn pending(&self, node: NodeId) -> usize {
        self.inboxes.lock().get(&node).map_or(0, VecDeque::len)
    }
}

/// One peer's handle on a [`LoopbackHub`]
#[derive(Clone)]
pub struct LoopbackTransport {
    local: NodeId,
    hub: LoopbackHub,
}

impl LoopbackTransport {
    pub fn local(&self) -> NodeId {
        self.local
    }

    /// Take everything delivered to this peer so far
    pub fn drain(&self) -> Vec<Delivery> {
        self.hub
            .inboxes
            .lock()
            .get_mut(&self.local)
            .map(|inbox| inbox.drain(..).collect())
            .unwrap_or_default()
    }
}

impl Transport for LoopbackTransport {
    fn send(&mut self, entity: EntityId, frame: Bytes, reliable: bool) -> MimicResult<()> {
        let mut inboxes = self.hub.inboxes.lock();
        if !inboxes.contains_key(&self.local) {
            return Err(MimicError::TransportError(format!(
                "{} is not attached to the hub",
                self.local
            )));
        }

        for (node, inbox) in inboxes.iter_mut() {
            if *node == self.local {
                continue;
            }
            inbox.push_back(Delivery {
                from: self.local,
                entity,
                frame: frame.clone(),
                reliable,
            });
        }
        Ok(())
    }
}
