//! Error types for replica placement.

/// Errors returned while placing replicas.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplicationError {
    /// The underlying ring lookup failed, e.g. because it is empty.
    #[error("ring lookup failed: {0}")]
    Ring(#[from] corelib::Error),

    /// A strategy was configured to place no replicas at all.
    #[error("replication factor must be at least 1")]
    ZeroReplicationFactor,
}
