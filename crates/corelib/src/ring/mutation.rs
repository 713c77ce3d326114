//! Membership changes.
//!
//! Both operations are pure: they read the current snapshot and return the
//! next one, leaving the input untouched. Publishing the result is the
//! caller's job (see [`HashRing`](crate::ring::HashRing)).

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::ring::snapshot::RingSnapshot;
use crate::token::Token;
use crate::vnode::{VirtualNode, MAX_PLACEMENT_ATTEMPTS};

/// The ring with `node_id` added at `replica_factor` positions.
///
/// # Collisions
///
/// A label whose position is already occupied, by another node or by an
/// earlier replica of this one, is retried with the next label. After
/// [`MAX_PLACEMENT_ATTEMPTS`] labels the replica is dropped. If no replica at
/// all can be placed the node is rejected.
///
/// # Errors
///
/// - [`Error::InvalidReplicaFactor`] if `replica_factor` is 0
/// - [`Error::DuplicateNode`] if `node_id` is already registered
/// - [`Error::PlacementExhausted`] if no position could be found
pub fn with_node(snapshot: &RingSnapshot, node_id: NodeId, replica_factor: usize) -> Result<RingSnapshot> {
    let replicas = match u32::try_from(replica_factor) {
        Ok(0) | Err(_) => return Err(Error::InvalidReplicaFactor(replica_factor)),
        Ok(n) => n,
    };
    if snapshot.registry.contains(node_id.as_str()) {
        return Err(Error::DuplicateNode(node_id));
    }

    let partitioner = snapshot.partitioner.as_ref();
    let mut placed: Vec<VirtualNode> = Vec::with_capacity(replica_factor);
    let mut claimed: HashSet<Token> = HashSet::with_capacity(replica_factor);
    let mut dropped = 0usize;

    for replica in 0..replicas {
        let vnode = (0..MAX_PLACEMENT_ATTEMPTS).find_map(|attempt| {
            let candidate = VirtualNode::from_label(partitioner, &node_id, replica, attempt);
            let occupied = snapshot.store.contains_token(candidate.token) || claimed.contains(&candidate.token);
            if occupied {
                trace!(node = %node_id, replica, attempt, token = %candidate.token, "virtual node position taken, retrying");
                metrics::counter!("ring_vnode_collisions_total").increment(1);
                None
            } else {
                Some(candidate)
            }
        });

        match vnode {
            Some(vnode) => {
                claimed.insert(vnode.token);
                placed.push(vnode);
            }
            None => {
                dropped += 1;
                warn!(
                    node = %node_id,
                    replica,
                    attempts = MAX_PLACEMENT_ATTEMPTS,
                    "no free ring position for virtual node, dropping replica"
                );
            }
        }
    }

    if placed.is_empty() {
        return Err(Error::PlacementExhausted {
            node: node_id,
            attempts: MAX_PLACEMENT_ATTEMPTS,
        });
    }

    let tokens: Vec<Token> = placed.iter().map(|vnode| vnode.token).collect();
    let registry = snapshot.registry.with_node(node_id.clone(), tokens)?;
    let store = snapshot.store.with_inserted(placed);
    let next = RingSnapshot {
        store,
        registry,
        partitioner: snapshot.partitioner.clone(),
        epoch: snapshot.epoch + 1,
    };

    debug!(
        node = %node_id,
        replica_factor,
        dropped,
        vnodes = next.token_count(),
        epoch = next.epoch,
        "built ring with node added"
    );
    Ok(next)
}

/// The ring with `node_id` and all of its stored positions removed.
///
/// # Errors
///
/// [`Error::NodeNotFound`] if `node_id` is not registered.
pub fn without_node(snapshot: &RingSnapshot, node_id: &str) -> Result<RingSnapshot> {
    let (registry, node_id, tokens) = snapshot.registry.without_node(node_id)?;
    let store = snapshot.store.without_tokens(&node_id, &tokens);
    assert_eq!(
        snapshot.store.len() - store.len(),
        tokens.len(),
        "stored positions of node {node_id} do not match the ring store"
    );

    let next = RingSnapshot {
        store,
        registry,
        partitioner: snapshot.partitioner.clone(),
        epoch: snapshot.epoch + 1,
    };

    debug!(
        node = %node_id,
        removed = tokens.len(),
        vnodes = next.token_count(),
        epoch = next.epoch,
        "built ring with node removed"
    );
    Ok(next)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::partitioner::{Partitioner, Xxh3Partitioner};

    /// Sends every primary label to one position; retry labels hash normally.
    #[derive(Debug)]
    struct PinnedPartitioner;

    impl Partitioner for PinnedPartitioner {
        fn partition(&self, key: &[u8]) -> Token {
            if key.windows(5).any(|w| w == b"retry") {
                Xxh3Partitioner.partition(key)
            } else {
                Token(42)
            }
        }

        fn max_token(&self) -> Token {
            Token(u64::MAX)
        }

        fn name(&self) -> &'static str {
            "PinnedPartitioner"
        }
    }

    /// Every label lands on the same position.
    #[derive(Debug)]
    struct ConstantPartitioner;

    impl Partitioner for ConstantPartitioner {
        fn partition(&self, _key: &[u8]) -> Token {
            Token(7)
        }

        fn max_token(&self) -> Token {
            Token(u64::MAX)
        }

        fn name(&self) -> &'static str {
            "ConstantPartitioner"
        }
    }

    fn empty() -> RingSnapshot {
        RingSnapshot::empty(Arc::new(Xxh3Partitioner))
    }

    #[test]
    fn test_add_places_replica_factor_positions() {
        let ring = with_node(&empty(), NodeId::from("A"), 3).unwrap();
        ring.verify();
        assert_eq!(ring.token_count(), 3);
        assert_eq!(ring.node_count(), 1);
        assert_eq!(ring.epoch(), 1);
    }

    #[test]
    fn test_add_leaves_input_untouched() {
        let base = with_node(&empty(), NodeId::from("A"), 3).unwrap();
        let next = with_node(&base, NodeId::from("B"), 3).unwrap();
        assert_eq!(base.node_count(), 1);
        assert_eq!(base.token_count(), 3);
        assert_eq!(next.token_count(), 6);
    }

    #[test]
    fn test_zero_replica_factor_is_rejected() {
        assert_eq!(
            with_node(&empty(), NodeId::from("A"), 0).unwrap_err(),
            Error::InvalidReplicaFactor(0)
        );
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let ring = with_node(&empty(), NodeId::from("A"), 3).unwrap();
        let err = with_node(&ring, NodeId::from("A"), 5).unwrap_err();
        assert_eq!(err, Error::DuplicateNode(NodeId::from("A")));
    }

    #[test]
    fn test_positions_are_deterministic() {
        let a = with_node(&empty(), NodeId::from("A"), 8).unwrap();
        let b = with_node(&empty(), NodeId::from("A"), 8).unwrap();
        assert_eq!(a.tokens(), b.tokens());
    }

    #[test]
    fn test_collision_retries_instead_of_overwriting() {
        let base = RingSnapshot::empty(Arc::new(PinnedPartitioner));
        let ring = with_node(&base, NodeId::from("A"), 3).unwrap();
        ring.verify();
        // A:0 takes position 42, A:1 and A:2 fall back to retry labels.
        assert_eq!(ring.token_count(), 3);
        assert_eq!(ring.store.owner_of(Token(42)).unwrap(), "A");

        let ring = with_node(&ring, NodeId::from("B"), 3).unwrap();
        ring.verify();
        assert_eq!(ring.token_count(), 6);
        assert_eq!(ring.store.owner_of(Token(42)).unwrap(), "A");
        assert!(ring.tokens_of("B").unwrap().iter().all(|t| *t != Token(42)));
    }

    #[test]
    fn test_unplaceable_replicas_are_dropped() {
        let base = RingSnapshot::empty(Arc::new(ConstantPartitioner));
        let ring = with_node(&base, NodeId::from("A"), 3).unwrap();
        ring.verify();
        assert_eq!(ring.token_count(), 1);

        let err = with_node(&ring, NodeId::from("B"), 3).unwrap_err();
        assert_eq!(
            err,
            Error::PlacementExhausted {
                node: NodeId::from("B"),
                attempts: MAX_PLACEMENT_ATTEMPTS,
            }
        );
    }

    #[test]
    fn test_remove_deletes_exactly_stored_positions() {
        let ring = with_node(&empty(), NodeId::from("A"), 4).unwrap();
        let ring = with_node(&ring, NodeId::from("B"), 4).unwrap();
        let a_tokens = ring.tokens_of("A").unwrap().to_vec();

        let after = without_node(&ring, "B").unwrap();
        after.verify();
        assert_eq!(after.token_count(), 4);
        assert_eq!(after.tokens_of("A").unwrap(), a_tokens.as_slice());
        assert!(!after.contains_node("B"));
        assert_eq!(after.epoch(), 3);
    }

    #[test]
    fn test_remove_unknown() {
        assert_eq!(
            without_node(&empty(), "ghost").unwrap_err(),
            Error::NodeNotFound(NodeId::from("ghost"))
        );
    }

    #[test]
    fn test_remove_last_node_empties_ring() {
        let ring = with_node(&empty(), NodeId::from("A"), 3).unwrap();
        let ring = without_node(&ring, "A").unwrap();
        ring.verify();
        assert!(ring.is_empty());
        assert_eq!(ring.lookup("k"), Err(Error::EmptyRing));
    }
}
