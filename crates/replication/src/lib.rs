//! Replication strategies for consistent hashing.
//!
//! This crate decides which nodes hold copies of a key:
//! - How many replicas to place
//! - Which nodes they go to, walking the ring clockwise from the key

pub mod error;
pub mod placement;
pub mod strategy;

pub use error::ReplicationError;
pub use placement::ReplicaPlacement;
pub use strategy::{ReplicationStrategy, SimpleStrategy};
