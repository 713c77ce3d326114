//! Immutable ring state.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::partitioner::Partitioner;
use crate::ring::registry::NodeRegistry;
use crate::ring::store::RingStore;
use crate::token::Token;

/// A fully built ring: sorted positions plus the node → positions index.
///
/// Snapshots are never modified after construction. Membership changes
/// produce a new snapshot (see [`crate::ring::mutation`]) and the
/// [`HashRing`](crate::ring::HashRing) publishes it with a single pointer
/// swap, so a reader holding a snapshot always sees one consistent ring.
#[derive(Clone)]
pub struct RingSnapshot {
    pub(crate) store: RingStore,
    pub(crate) registry: NodeRegistry,
    pub(crate) partitioner: Arc<dyn Partitioner>,
    pub(crate) epoch: u64,
}

impl RingSnapshot {
    /// An empty ring using `partitioner`.
    pub fn empty(partitioner: Arc<dyn Partitioner>) -> Self {
        Self {
            store: RingStore::new(),
            registry: NodeRegistry::new(),
            partitioner,
            epoch: 0,
        }
    }

    /// Node owning `key`: the first virtual node clockwise from the key's
    /// position.
    pub fn lookup(&self, key: impl AsRef<[u8]>) -> Result<NodeId> {
        self.lookup_token(self.partitioner.partition(key.as_ref()))
    }

    /// Node owning the ring position `token`.
    pub fn lookup_token(&self, token: Token) -> Result<NodeId> {
        self.store
            .successor(token)
            .map(|vnode| vnode.node_id.clone())
            .ok_or(Error::EmptyRing)
    }

    /// Up to `n` distinct nodes walking clockwise from `key`'s position.
    ///
    /// The first element is the node [`lookup`](Self::lookup) returns. Fewer
    /// than `n` nodes come back when fewer are registered.
    pub fn lookup_n(&self, key: impl AsRef<[u8]>, n: usize) -> Result<Vec<NodeId>> {
        if self.store.is_empty() {
            return Err(Error::EmptyRing);
        }
        let wanted = n.min(self.registry.len());
        let mut found = Vec::with_capacity(wanted);
        if wanted == 0 {
            return Ok(found);
        }

        let token = self.partitioner.partition(key.as_ref());
        let mut seen = HashSet::with_capacity(wanted);
        for vnode in self.store.walk_from(token) {
            if seen.insert(&vnode.node_id) {
                found.push(vnode.node_id.clone());
                if found.len() == wanted {
                    break;
                }
            }
        }
        Ok(found)
    }

    /// Registered nodes, in id order.
    pub fn list_nodes(&self) -> Vec<NodeId> {
        self.registry.list_nodes()
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.registry.contains(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.registry.len()
    }

    /// Total virtual nodes on the ring.
    pub fn token_count(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// All `(position, owner)` pairs in ring order.
    pub fn tokens(&self) -> Vec<(Token, NodeId)> {
        self.store
            .iter()
            .map(|vnode| (vnode.token, vnode.node_id.clone()))
            .collect()
    }

    /// Positions owned by `node_id`, sorted.
    pub fn tokens_of(&self, node_id: &str) -> Option<&[Token]> {
        self.registry.tokens_of(node_id)
    }

    pub fn store(&self) -> &RingStore {
        &self.store
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn partitioner(&self) -> &Arc<dyn Partitioner> {
        &self.partitioner
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }

    /// Number of mutations applied since the ring was created.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Check every structural invariant, panicking on the first violation.
    ///
    /// A violation means the mutation path built an inconsistent ring and
    /// routing can no longer be trusted.
    pub fn verify(&self) {
        assert!(self.store.is_strictly_sorted(), "ring store is not strictly sorted (epoch {})", self.epoch);
        assert_eq!(
            self.store.is_empty(),
            self.registry.is_empty(),
            "ring store and node registry disagree on emptiness (epoch {})",
            self.epoch
        );
        assert_eq!(
            self.store.len(),
            self.registry.token_count(),
            "ring store and node registry disagree on virtual node count (epoch {})",
            self.epoch
        );
        for (node_id, tokens) in self.registry.iter() {
            assert!(!tokens.is_empty(), "node {node_id} registered without positions");
            for token in tokens {
                assert_eq!(
                    self.store.owner_of(*token),
                    Some(node_id),
                    "position {token} of node {node_id} missing from ring store (epoch {})",
                    self.epoch
                );
            }
        }
    }
}

impl fmt::Debug for RingSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingSnapshot")
            .field("epoch", &self.epoch)
            .field("nodes", &self.registry.len())
            .field("vnodes", &self.store.len())
            .field("partitioner", &self.partitioner.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partitioner::Xxh3Partitioner;
    use crate::vnode::VirtualNode;

    fn snapshot(entries: &[(u64, &str)]) -> RingSnapshot {
        let mut registry = NodeRegistry::new();
        let mut by_node: std::collections::BTreeMap<&str, Vec<Token>> = Default::default();
        for (token, node) in entries {
            by_node.entry(*node).or_default().push(Token(*token));
        }
        for (node, tokens) in by_node {
            registry = registry.with_node(NodeId::from(node), tokens).unwrap();
        }
        let store = RingStore::new().with_inserted(
            entries
                .iter()
                .map(|(token, node)| VirtualNode::new(Token(*token), NodeId::from(*node), 0))
                .collect(),
        );
        RingSnapshot {
            store,
            registry,
            partitioner: Arc::new(Xxh3Partitioner),
            epoch: 1,
        }
    }

    #[test]
    fn test_empty_lookup_fails() {
        let empty = RingSnapshot::empty(Arc::new(Xxh3Partitioner));
        assert_eq!(empty.lookup("anything"), Err(Error::EmptyRing));
        assert_eq!(empty.lookup_n("anything", 2), Err(Error::EmptyRing));
        empty.verify();
    }

    #[test]
    fn test_lookup_token_wraps() {
        let snap = snapshot(&[(100, "A"), (200, "B"), (300, "C")]);
        snap.verify();
        assert_eq!(snap.lookup_token(Token(150)).unwrap(), "B");
        assert_eq!(snap.lookup_token(Token(301)).unwrap(), "A");
    }

    #[test]
    fn test_lookup_n_distinct_clockwise() {
        let snap = snapshot(&[(100, "A"), (150, "A"), (200, "B"), (300, "C")]);
        let key = "k";
        let token = Xxh3Partitioner.partition(key.as_bytes());
        let all = snap.lookup_n(key, 10).unwrap();

        assert_eq!(all.len(), 3);
        assert_eq!(all[0], snap.lookup_token(token).unwrap());
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), 3);

        assert!(snap.lookup_n(key, 0).unwrap().is_empty());
        assert_eq!(snap.lookup_n(key, 1).unwrap(), vec![all[0].clone()]);
    }

    #[test]
    #[should_panic(expected = "missing from ring store")]
    fn test_verify_catches_registry_store_mismatch() {
        let mut snap = snapshot(&[(100, "A"), (200, "B")]);
        snap.registry = NodeRegistry::new()
            .with_node(NodeId::from("A"), vec![Token(100)])
            .unwrap()
            .with_node(NodeId::from("B"), vec![Token(250)])
            .unwrap();
        snap.verify();
    }
}
