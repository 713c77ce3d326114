//! Concurrent hash ring.
//!
//! [`HashRing`] owns the currently published [`RingSnapshot`] and is the only
//! place it changes. Lookups clone the snapshot `Arc` once and work on that
//! copy; membership changes are serialized by a writer mutex, build the next
//! snapshot off to the side and swap it in.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::config::RingConfig;
use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::partitioner::Partitioner;
use crate::ring::mutation;
use crate::ring::snapshot::RingSnapshot;

/// Thread-safe consistent hash ring.
///
/// Any number of threads may call [`lookup`](Self::lookup) while another
/// thread adds or removes nodes. A lookup that starts after a mutation call
/// returned observes that mutation; a concurrent one sees either the old or
/// the new ring, never a mix.
///
/// Building the next snapshot never holds up readers. The published pointer
/// sits behind a read-write lock, so a lookup can still wait for the length
/// of the pointer swap itself.
pub struct HashRing {
    current: RwLock<Arc<RingSnapshot>>,
    writer: Mutex<()>,
    default_replica_factor: usize,
}

impl HashRing {
    /// Empty ring with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RingConfig::default())
    }

    pub fn with_config(config: RingConfig) -> Self {
        Self::with_partitioner(config.partitioner.build(), config.default_replica_factor)
    }

    /// Empty ring using a caller-supplied hash function.
    pub fn with_partitioner(partitioner: Arc<dyn Partitioner>, default_replica_factor: usize) -> Self {
        Self {
            current: RwLock::new(Arc::new(RingSnapshot::empty(partitioner))),
            writer: Mutex::new(()),
            default_replica_factor,
        }
    }

    /// The currently published ring.
    ///
    /// The read lock is held only long enough to clone the `Arc`.
    pub fn snapshot(&self) -> Arc<RingSnapshot> {
        Arc::clone(&*self.current.read())
    }

    /// Register `node_id` with `replica_factor` virtual nodes.
    pub fn add_node(&self, node_id: impl Into<NodeId>, replica_factor: usize) -> Result<()> {
        let node_id = node_id.into();
        let published = self.mutate(|current| mutation::with_node(current, node_id.clone(), replica_factor))?;
        metrics::counter!("ring_nodes_added_total").increment(1);
        info!(node = %node_id, vnodes = published.tokens_of(node_id.as_str()).map_or(0, <[_]>::len), epoch = published.epoch(), "node added to ring");
        Ok(())
    }

    /// Register `node_id` with the configured default replica factor.
    pub fn add_node_with_default(&self, node_id: impl Into<NodeId>) -> Result<()> {
        self.add_node(node_id, self.default_replica_factor)
    }

    /// Deregister `node_id` and drop all of its virtual nodes.
    pub fn remove_node(&self, node_id: impl AsRef<str>) -> Result<()> {
        let node_id = node_id.as_ref();
        let published = self.mutate(|current| mutation::without_node(current, node_id))?;
        metrics::counter!("ring_nodes_removed_total").increment(1);
        info!(node = %node_id, epoch = published.epoch(), "node removed from ring");
        Ok(())
    }

    /// Node owning `key`.
    pub fn lookup(&self, key: impl AsRef<[u8]>) -> Result<NodeId> {
        let result = self.snapshot().lookup(key);
        if let Err(Error::EmptyRing) = result {
            metrics::counter!("ring_lookups_empty_total").increment(1);
        }
        result
    }

    /// Up to `n` distinct nodes clockwise from `key`, primary first.
    pub fn lookup_n(&self, key: impl AsRef<[u8]>, n: usize) -> Result<Vec<NodeId>> {
        self.snapshot().lookup_n(key, n)
    }

    pub fn list_nodes(&self) -> Vec<NodeId> {
        self.snapshot().list_nodes()
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.snapshot().contains_node(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.snapshot().node_count()
    }

    pub fn token_count(&self) -> usize {
        self.snapshot().token_count()
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.snapshot().partitioner_name()
    }

    pub fn default_replica_factor(&self) -> usize {
        self.default_replica_factor
    }

    /// Single writer entry point: build the next snapshot from the current
    /// one, verify it, then publish it. On error nothing is published.
    fn mutate<F>(&self, build: F) -> Result<Arc<RingSnapshot>>
    where
        F: FnOnce(&RingSnapshot) -> Result<RingSnapshot>,
    {
        let _writer = self.writer.lock();
        let current = self.snapshot();
        let next = build(&current)?;
        next.verify();

        let next = Arc::new(next);
        *self.current.write() = Arc::clone(&next);

        metrics::gauge!("ring_nodes").set(next.node_count() as f64);
        metrics::gauge!("ring_vnodes").set(next.token_count() as f64);
        Ok(next)
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HashRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashRing")
            .field("snapshot", &*self.snapshot())
            .field("default_replica_factor", &self.default_replica_factor)
            .finish()
    }
}

/// Builder for a pre-populated [`HashRing`].
///
/// ```rust
/// use corelib::ring::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .with_vnodes(64)
///     .add_node("cache-a")
///     .add_node_with_vnodes("cache-b", 128)
///     .build()
///     .unwrap();
/// assert_eq!(ring.node_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct RingBuilder {
    config: RingConfig,
    partitioner: Option<Arc<dyn Partitioner>>,
    nodes: Vec<(NodeId, Option<usize>)>,
}

impl RingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: RingConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Default virtual nodes per physical node.
    pub fn with_vnodes(mut self, vnodes: usize) -> Self {
        self.config.default_replica_factor = vnodes;
        self
    }

    /// Use a custom hash function instead of the configured kind.
    pub fn with_partitioner(mut self, partitioner: Arc<dyn Partitioner>) -> Self {
        self.partitioner = Some(partitioner);
        self
    }

    pub fn add_node(mut self, node_id: impl Into<NodeId>) -> Self {
        self.nodes.push((node_id.into(), None));
        self
    }

    pub fn add_node_with_vnodes(mut self, node_id: impl Into<NodeId>, vnodes: usize) -> Self {
        self.nodes.push((node_id.into(), Some(vnodes)));
        self
    }

    /// Build the ring, failing on the first node that cannot be added.
    pub fn build(self) -> Result<HashRing> {
        let partitioner = self.partitioner.unwrap_or_else(|| self.config.partitioner.build());
        let ring = HashRing::with_partitioner(partitioner, self.config.default_replica_factor);
        for (node_id, vnodes) in self.nodes {
            ring.add_node(node_id, vnodes.unwrap_or(self.config.default_replica_factor))?;
        }
        Ok(ring)
    }
}
