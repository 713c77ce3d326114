//! Ring configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::partitioner::PartitionerKind;

/// Parameters fixed when a ring is constructed.
///
/// Deserializes from partial documents; missing fields take their defaults.
///
/// ```json
/// { "default_replica_factor": 64, "partitioner": "xxh32" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RingConfig {
    /// Virtual nodes per physical node when the caller does not pass one.
    pub default_replica_factor: usize,
    /// Hash function for keys and virtual node labels.
    pub partitioner: PartitionerKind,
}

impl RingConfig {
    pub const DEFAULT_REPLICA_FACTOR: usize = 3;

    pub fn with_replica_factor(mut self, replica_factor: usize) -> Self {
        self.default_replica_factor = replica_factor;
        self
    }

    pub fn with_partitioner(mut self, partitioner: PartitionerKind) -> Self {
        self.partitioner = partitioner;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_replica_factor == 0 {
            return Err(Error::InvalidReplicaFactor(0));
        }
        Ok(())
    }
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            default_replica_factor: Self::DEFAULT_REPLICA_FACTOR,
            partitioner: PartitionerKind::default(),
        }
    }
}
