//! Identity types for mimic
//!
//! Peer and entity identifiers are 64-bit for wire efficiency. State and
//! transition hashes are the animation engine's 32-bit full-path hashes.

use std::fmt;

/// Peer identity within a session
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u64);

impl NodeId {
    pub const ZERO: NodeId = NodeId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        NodeId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        NodeId(u64::from_le_bytes(bytes))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({:016x})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Entity addressing token - the same on every peer of a session
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EntityId(pub u64);

impl EntityId {
    #[inline]
    pub fn new(id: u64) -> Self {
        EntityId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        EntityId(u64::from_le_bytes(bytes))
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({:016x})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Full-path hash of a settled animation state.
///
/// `StateHash::NONE` (0) is the wire sentinel for "no actionable state".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateHash(pub i32);

impl StateHash {
    pub const NONE: StateHash = StateHash(0);

    #[inline]
    pub fn new(hash: i32) -> Self {
        StateHash(hash)
    }

    /// Is this the reserved "no-op" sentinel?
    #[inline]
    pub fn is_sentinel(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for StateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State({:08x})", self.0)
    }
}

impl fmt::Display for StateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Full-path hash of an in-progress transition between two states
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransitionHash(pub i32);

impl TransitionHash {
    #[inline]
    pub fn new(hash: i32) -> Self {
        TransitionHash(hash)
    }
}

impl fmt::Debug for TransitionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transition({:08x})", self.0)
    }
}
