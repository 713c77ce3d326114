//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Each physical node owns several positions on the ring instead of one.
//! With a single position per node, the arc a node owns depends on where one
//! hash happened to land, and arcs can differ wildly in size. Spreading each
//! node over `replica_factor` independent positions evens that out:
//!
//! 1. **Better Load Distribution**: more positions per node means smaller
//!    variance in the keyspace fraction each node owns
//! 2. **Gradual Rebalancing**: a joining node takes small slices from many
//!    neighbours rather than one large slice from a single node
//!
//! # Labels
//!
//! A virtual node's position is the hash of its label, `"{node}:{replica}"`.
//! When that position is already taken, placement retries with
//! `"{node}:{replica}:retry"`, then `"{node}:{replica}:retry2"` and so on, up
//! to [`MAX_PLACEMENT_ATTEMPTS`] labels per replica. The existing owner of a
//! position is never overwritten.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::node::NodeId;
use crate::partitioner::Partitioner;
use crate::token::Token;

/// Upper bound on labels tried for a single replica before it is dropped.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 16;

/// A virtual node on the hash ring.
///
/// # Invariants
///
/// - Every `VirtualNode` in a ring has a unique token
/// - `token` is a pure function of `(node_id, replica, attempt)` and the
///   ring's partitioner
///
/// Ordering is by token first, so a sorted `Vec<VirtualNode>` is sorted by
/// ring position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VirtualNode {
    /// Position on the ring.
    pub token: Token,

    /// The physical node that owns this virtual node.
    pub node_id: NodeId,

    /// Replica index within the owning node, `0..replica_factor`.
    pub replica: u32,
}

impl VirtualNode {
    /// Create a new virtual node.
    #[inline]
    pub fn new(token: Token, node_id: NodeId, replica: u32) -> Self {
        Self {
            token,
            node_id,
            replica,
        }
    }

    /// Create a virtual node by hashing the label for `attempt`.
    ///
    /// Attempt 0 is the primary label; higher attempts are the collision
    /// retry labels described in the module docs.
    pub fn from_label(
        partitioner: &dyn Partitioner,
        node_id: &NodeId,
        replica: u32,
        attempt: usize,
    ) -> Self {
        let label = vnode_label(node_id, replica, attempt);
        Self::new(partitioner.partition(label.as_bytes()), node_id.clone(), replica)
    }

    /// Get the token position.
    #[inline]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Get the owning node ID.
    #[inline]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VNode(token={}, node={}, replica={})", self.token, self.node_id, self.replica)
    }
}

/// Label hashed to place `replica` of `node_id` on attempt `attempt`.
pub fn vnode_label(node_id: &NodeId, replica: u32, attempt: usize) -> String {
    match attempt {
        0 => format!("{node_id}:{replica}"),
        1 => format!("{node_id}:{replica}:retry"),
        n => format!("{node_id}:{replica}:retry{n}"),
    }
}
