//! Core library for consistent hashing.
//!
//! This crate provides:
//! - Tokens and the partitioners (hash functions) that produce them
//! - Node and virtual node abstractions
//! - An immutable ring snapshot with O(log m) successor lookup
//! - A concurrent ring handle that publishes snapshots atomically
//! - Topology views: ownership, token ranges and rebalancing reports

pub mod config;
pub mod error;
pub mod node;
pub mod partitioner;
pub mod ring;
pub mod token;
pub mod topology;
pub mod vnode;

pub use config::RingConfig;
pub use error::{Error, Result};
pub use node::NodeId;
pub use partitioner::{Partitioner, PartitionerKind};
pub use ring::{HashRing, Ring, RingBuilder, RingSnapshot};
pub use token::Token;
pub use topology::Topology;
pub use vnode::VirtualNode;
