//! Simple replication strategy.
//!
//! Places N replicas sequentially around the ring (clockwise from the primary).
//!
//! # Algorithm
//!
//! 1. Find primary node (clockwise search from key's token)
//! 2. Continue clockwise, skipping virtual nodes of nodes already chosen,
//!    until N distinct nodes are found or the ring is exhausted
//!
//! # Limitations
//!
//! - Doesn't consider data center/rack placement
//! - Returns fewer than N nodes when the ring has fewer than N nodes

use corelib::RingSnapshot;

use crate::error::ReplicationError;
use crate::placement::ReplicaPlacement;
use crate::strategy::ReplicationStrategy;

/// N distinct nodes walking clockwise from the key.
///
/// # Example
///
/// ```rust
/// use corelib::ring::RingBuilder;
/// use replication::{ReplicationStrategy, SimpleStrategy};
///
/// let ring = RingBuilder::new()
///     .with_vnodes(16)
///     .add_node("A")
///     .add_node("B")
///     .add_node("C")
///     .build()
///     .unwrap();
///
/// let strategy = SimpleStrategy::new(2).unwrap();
/// let placement = strategy.replicas_for_key(&ring.snapshot(), b"my-key").unwrap();
/// assert_eq!(placement.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SimpleStrategy {
    /// Number of replicas to create (including primary).
    replication_factor: usize,
}

impl SimpleStrategy {
    /// Create a new simple strategy with the given replication factor.
    ///
    /// # Errors
    ///
    /// [`ReplicationError::ZeroReplicationFactor`] for 0.
    pub fn new(replication_factor: usize) -> Result<Self, ReplicationError> {
        if replication_factor == 0 {
            return Err(ReplicationError::ZeroReplicationFactor);
        }
        Ok(Self { replication_factor })
    }
}

impl Default for SimpleStrategy {
    /// Primary plus two replicas.
    fn default() -> Self {
        Self { replication_factor: 3 }
    }
}

impl ReplicationStrategy for SimpleStrategy {
    fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    fn replicas_for_key(&self, ring: &RingSnapshot, key: &[u8]) -> Result<ReplicaPlacement, ReplicationError> {
        let nodes = ring.lookup_n(key, self.replication_factor)?;
        ReplicaPlacement::from_nodes(nodes).ok_or(ReplicationError::Ring(corelib::Error::EmptyRing))
    }

    fn name(&self) -> &'static str {
        "SimpleStrategy"
    }
}
