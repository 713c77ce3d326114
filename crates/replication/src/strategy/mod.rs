//! Replication strategy abstractions.
//!
//! Replication strategies determine how many replicas to create and where
//! to place them on the ring.
//!
//! - **SimpleStrategy**: N distinct nodes placed sequentially around the ring

pub mod simple;

pub use simple::SimpleStrategy;

use corelib::RingSnapshot;

use crate::error::ReplicationError;
use crate::placement::ReplicaPlacement;

/// Trait for replication strategies.
///
/// Strategies take a ring snapshot rather than the live ring so that every
/// replica of one key is chosen from the same membership view.
pub trait ReplicationStrategy: Send + Sync + 'static {
    /// Number of copies this strategy wants, primary included.
    fn replication_factor(&self) -> usize;

    /// Find replica nodes for a given key.
    ///
    /// # Errors
    ///
    /// Fails when the ring is empty.
    fn replicas_for_key(&self, ring: &RingSnapshot, key: &[u8]) -> Result<ReplicaPlacement, ReplicationError>;

    /// Get the strategy name (for logging/debugging).
    fn name(&self) -> &'static str;
}
