//! Error types for the core library.

use crate::node::NodeId;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by ring lookups and membership changes.
///
/// All of these describe ordinary caller input conditions. Internal
/// invariant violations are not represented here; they panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Lookup against a ring with no registered nodes.
    #[error("ring is empty")]
    EmptyRing,

    /// The node is already registered.
    #[error("node {0} is already registered")]
    DuplicateNode(NodeId),

    /// The node is not registered.
    #[error("node {0} is not registered")]
    NodeNotFound(NodeId),

    /// A node must own at least one virtual node.
    #[error("invalid replica factor {0}, must be at least 1")]
    InvalidReplicaFactor(usize),

    /// Every replica of the node collided with an occupied position.
    #[error("no free ring position for node {node} after {attempts} attempts per replica")]
    PlacementExhausted {
        /// Node that could not be placed.
        node: NodeId,
        /// Attempts made for each replica.
        attempts: usize,
    },
}
