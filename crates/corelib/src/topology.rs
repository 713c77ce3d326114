//! Ring topology views.
//!
//! Read-only analysis over a [`RingSnapshot`]: which arc of the keyspace each
//! virtual node owns, what fraction of the keyspace each physical node owns,
//! and how key assignments move between two rings.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::node::NodeId;
use crate::ring::RingSnapshot;
use crate::token::Token;

/// The arc `(start, end]` owned by one virtual node.
///
/// `start` is the previous virtual node's position. The range wraps when
/// `start >= end`; with a single virtual node it covers the whole ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRange {
    pub start: Token,
    pub end: Token,
    pub owner: NodeId,
}

impl TokenRange {
    pub fn contains(&self, token: Token) -> bool {
        if self.start < self.end {
            self.start < token && token <= self.end
        } else {
            token > self.start || token <= self.end
        }
    }

    pub fn wraps(&self) -> bool {
        self.start >= self.end
    }
}

/// Ownership layout of one snapshot.
#[derive(Debug, Clone)]
pub struct Topology {
    ranges: Vec<TokenRange>,
    keyspace: u128,
    max_token: Token,
}

impl Topology {
    pub fn from_snapshot(snapshot: &RingSnapshot) -> Self {
        let vnodes = snapshot.store().as_slice();
        let ranges = vnodes
            .iter()
            .enumerate()
            .map(|(idx, vnode)| {
                let prev = if idx == 0 { &vnodes[vnodes.len() - 1] } else { &vnodes[idx - 1] };
                TokenRange {
                    start: prev.token,
                    end: vnode.token,
                    owner: vnode.node_id.clone(),
                }
            })
            .collect();

        Self {
            ranges,
            keyspace: snapshot.partitioner().keyspace_size(),
            max_token: snapshot.partitioner().max_token(),
        }
    }

    /// Ranges in ring order, one per virtual node.
    pub fn ranges(&self) -> &[TokenRange] {
        &self.ranges
    }

    pub fn ranges_of<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a TokenRange> + 'a {
        self.ranges.iter().filter(move |range| range.owner == *node_id)
    }

    /// Number of positions in `range`.
    pub fn range_width(&self, range: &TokenRange) -> u128 {
        if self.ranges.len() == 1 {
            return self.keyspace;
        }
        range.start.distance_within(range.end, self.max_token)
    }

    /// Fraction of the keyspace each node owns. Sums to 1.0 on a non-empty
    /// ring.
    pub fn ownership(&self) -> BTreeMap<NodeId, f64> {
        let mut owned: BTreeMap<NodeId, u128> = BTreeMap::new();
        for range in &self.ranges {
            *owned.entry(range.owner.clone()).or_default() += self.range_width(range);
        }
        owned
            .into_iter()
            .map(|(node, width)| (node, width as f64 / self.keyspace as f64))
            .collect()
    }
}

/// A key whose owner differs between two rings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remap {
    pub key: String,
    pub from: NodeId,
    pub to: NodeId,
}

/// Keys among `keys` that change owner going from `old` to `new`.
///
/// Fails with [`EmptyRing`](crate::Error::EmptyRing) if either ring is
/// empty.
pub fn remapped_keys<I, K>(old: &RingSnapshot, new: &RingSnapshot, keys: I) -> Result<Vec<Remap>>
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let mut remaps = Vec::new();
    for key in keys {
        let key = key.as_ref();
        let from = old.lookup(key)?;
        let to = new.lookup(key)?;
        if from != to {
            remaps.push(Remap {
                key: key.to_owned(),
                from,
                to,
            });
        }
    }
    Ok(remaps)
}

/// Per-node key counts over a sample of keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadStats {
    pub counts: BTreeMap<NodeId, usize>,
    pub total: usize,
}

impl LoadStats {
    pub fn mean(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        self.total as f64 / self.counts.len() as f64
    }

    /// Population variance of the per-node counts.
    pub fn variance(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        self.counts
            .values()
            .map(|count| {
                let diff = *count as f64 - mean;
                diff * diff
            })
            .sum::<f64>()
            / self.counts.len() as f64
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Count how many of `keys` land on each registered node. Nodes that
/// receive nothing are reported with 0.
pub fn load_stats<I, K>(snapshot: &RingSnapshot, keys: I) -> Result<LoadStats>
where
    I: IntoIterator<Item = K>,
    K: AsRef<[u8]>,
{
    let mut counts: BTreeMap<NodeId, usize> = snapshot.list_nodes().into_iter().map(|node| (node, 0)).collect();
    let mut total = 0;
    for key in keys {
        *counts.entry(snapshot.lookup(key)?).or_default() += 1;
        total += 1;
    }
    Ok(LoadStats { counts, total })
}
