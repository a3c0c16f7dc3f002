//! Authority - which peer may sample and send for an entity
//!
//! Exactly one peer owns an entity. The owner samples and sends; every other
//! peer only applies. Both paths ask [`Authority`] first.

use std::collections::HashMap;

use mimic_core::{EntityId, NodeId};

/// Single-writer check
pub trait Authority {
    /// Is this peer the source of truth for `entity`?
    fn is_locally_authoritative(&self, entity: EntityId) -> bool;
}

impl<A: Authority + ?Sized> Authority for &A {
    fn is_locally_authoritative(&self, entity: EntityId) -> bool {
        (**self).is_locally_authoritative(entity)
    }
}

/// Entity ownership as seen from one peer
#[derive(Clone, Debug)]
pub struct OwnershipTable {
    /// This peer
    local: NodeId,
    /// Owner of each known entity
    owners: HashMap<EntityId, NodeId>,
}

impl OwnershipTable {
    pub fn new(local: NodeId) -> Self {
        OwnershipTable {
            local,
            owners: HashMap::new(),
        }
    }

    pub fn local(&self) -> NodeId {
        self.local
    }

    /// Record (or move) ownership of an entity
    pub fn assign(&mut self, entity: EntityId, owner: NodeId) {
        self.owners.insert(entity, owner);
    }

    pub fn release(&mut self, entity: EntityId) -> Option<NodeId> {
        self.owners.remove(&entity)
    }

    pub fn owner(&self, entity: EntityId) -> Option<NodeId> {
        self.owners.get(&entity).copied()
    }

    /// Entities this peer owns
    pub fn owned(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.owners
            .iter()
            .filter(move |(_, owner)| **owner == self.local)
            .map(|(entity, _)| *entity)
    }
}

impl Authority for OwnershipTable {
    fn is_locally_authoritative(&self, entity: EntityId) -> bool {
        self.owner(entity) == Some(self.local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership() {
        let mut table = OwnershipTable::new(NodeId::new(1));
        table.assign(EntityId::new(10), NodeId::new(1));
        table.assign(EntityId::new(11), NodeId::new(2));

        assert!(table.is_locally_authoritative(EntityId::new(10)));
        assert!(!table.is_locally_authoritative(EntityId::new(11)));
        assert!(!table.is_locally_authoritative(EntityId::new(12)));

        let owned: Vec<_> = table.owned().collect();
        assert_eq!(owned, [EntityId::new(10)]);
    }

    #[test]
    fn test_ownership_transfer() {
        let mut table = OwnershipTable::new(NodeId::new(1));
        table.assign(EntityId::new(10), NodeId::new(2));
        assert!(!table.is_locally_authoritative(EntityId::new(10)));

        table.assign(EntityId::new(10), NodeId::new(1));
        assert!(table.is_locally_authoritative(EntityId::new(10)));

        assert_eq!(table.release(EntityId::new(10)), Some(NodeId::new(1)));
        assert!(!table.is_locally_authoritative(EntityId::new(10)));
    }
}
