//! Subcommands and their reports.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{bail, Context};
use clap::Subcommand;
use corelib::ring::HashRing;
use corelib::topology::{load_stats, remapped_keys, Topology};
use corelib::{NodeId, Token};
use replication::{ReplicationStrategy, SimpleStrategy};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the owner of each key, and with `-n` its replica set.
    Lookup {
        #[arg(required = true)]
        keys: Vec<String>,

        /// Distinct nodes to return per key.
        #[arg(short, default_value_t = 1)]
        n: usize,
    },

    /// Spread synthetic keys over the ring and report per-node load.
    Distribution {
        /// Number of synthetic keys.
        #[arg(long, default_value_t = 100_000)]
        keys: usize,
    },

    /// Add or remove one node and report which keys move.
    Rebalance {
        /// Node to add.
        #[arg(long, conflicts_with = "remove", required_unless_present = "remove")]
        add: Option<String>,

        /// Node to remove.
        #[arg(long)]
        remove: Option<String>,

        /// Number of synthetic keys.
        #[arg(long, default_value_t = 100_000)]
        keys: usize,
    },

    /// List every virtual node and the range it owns.
    Dump,
}

/// Output of one command.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CommandResult {
    Lookup(Vec<LookupRow>),
    Distribution(DistributionReport),
    Rebalance(RebalanceReport),
    Dump(Vec<DumpRow>),
}

#[derive(Debug, Serialize)]
pub struct LookupRow {
    pub key: String,
    pub token: Token,
    pub nodes: Vec<NodeId>,
}

#[derive(Debug, Serialize)]
pub struct NodeLoad {
    pub node: NodeId,
    pub keys: usize,
    pub share: f64,
    pub ownership: f64,
}

#[derive(Debug, Serialize)]
pub struct DistributionReport {
    pub partitioner: &'static str,
    pub vnodes: usize,
    pub total_keys: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub nodes: Vec<NodeLoad>,
}

#[derive(Debug, Serialize)]
pub struct RebalanceReport {
    pub change: String,
    pub total_keys: usize,
    pub moved_keys: usize,
    pub moved_fraction: f64,
    /// Keyspace fraction that changed owner.
    pub expected_fraction: f64,
    /// `from -> to` pairs and how many keys took each.
    pub moves: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct DumpRow {
    pub token: Token,
    pub node: NodeId,
    pub range_start: Token,
    pub ownership: f64,
}

fn synthetic_keys(count: usize) -> impl Iterator<Item = String> {
    (0..count).map(|i| format!("key-{i}"))
}

impl Command {
    pub fn execute(&self, ring: &HashRing) -> anyhow::Result<CommandResult> {
        match self {
            Command::Lookup { keys, n } => lookup(ring, keys, *n),
            Command::Distribution { keys } => distribution(ring, *keys),
            Command::Rebalance { add, remove, keys } => rebalance(ring, add.as_deref(), remove.as_deref(), *keys),
            Command::Dump => Ok(dump(ring)),
        }
    }
}

fn lookup(ring: &HashRing, keys: &[String], n: usize) -> anyhow::Result<CommandResult> {
    let snapshot = ring.snapshot();
    let strategy = SimpleStrategy::new(n)?;
    let rows = keys
        .iter()
        .map(|key| {
            let placement = strategy
                .replicas_for_key(&snapshot, key.as_bytes())
                .with_context(|| format!("looking up {key}"))?;
            Ok(LookupRow {
                key: key.clone(),
                token: snapshot.partitioner().partition(key.as_bytes()),
                nodes: placement.all().cloned().collect(),
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CommandResult::Lookup(rows))
}

fn distribution(ring: &HashRing, keys: usize) -> anyhow::Result<CommandResult> {
    let snapshot = ring.snapshot();
    let stats = load_stats(&snapshot, synthetic_keys(keys))?;
    let ownership = Topology::from_snapshot(&snapshot).ownership();

    let nodes = stats
        .counts
        .iter()
        .map(|(node, count)| NodeLoad {
            node: node.clone(),
            keys: *count,
            share: if stats.total == 0 { 0.0 } else { *count as f64 / stats.total as f64 },
            ownership: ownership.get(node).copied().unwrap_or_default(),
        })
        .collect();

    Ok(CommandResult::Distribution(DistributionReport {
        partitioner: snapshot.partitioner_name(),
        vnodes: snapshot.token_count(),
        total_keys: stats.total,
        mean: stats.mean(),
        std_dev: stats.std_dev(),
        nodes,
    }))
}

fn rebalance(ring: &HashRing, add: Option<&str>, remove: Option<&str>, keys: usize) -> anyhow::Result<CommandResult> {
    let before = ring.snapshot();
    let (change, expected_fraction) = match (add, remove) {
        (Some(node), None) => {
            ring.add_node_with_default(node)?;
            let after = ring.snapshot();
            let share = Topology::from_snapshot(&after).ownership().get(node).copied().unwrap_or_default();
            (format!("add {node}"), share)
        }
        (None, Some(node)) => {
            if before.node_count() == 1 && before.contains_node(node) {
                bail!("cannot remove {node}: it is the only node, every key would be left without an owner");
            }
            let share = Topology::from_snapshot(&before).ownership().get(node).copied().unwrap_or_default();
            ring.remove_node(node)?;
            (format!("remove {node}"), share)
        }
        _ => bail!("exactly one of --add or --remove is required"),
    };
    let after = ring.snapshot();

    let remaps = remapped_keys(&before, &after, synthetic_keys(keys))?;
    let mut moves = BTreeMap::new();
    for remap in &remaps {
        *moves.entry(format!("{} -> {}", remap.from, remap.to)).or_insert(0) += 1;
    }
    info!(%change, moved = remaps.len(), total = keys, "rebalance computed");

    Ok(CommandResult::Rebalance(RebalanceReport {
        change,
        total_keys: keys,
        moved_keys: remaps.len(),
        moved_fraction: if keys == 0 { 0.0 } else { remaps.len() as f64 / keys as f64 },
        expected_fraction,
        moves,
    }))
}

fn dump(ring: &HashRing) -> CommandResult {
    let snapshot = ring.snapshot();
    let topology = Topology::from_snapshot(&snapshot);
    let keyspace = snapshot.partitioner().keyspace_size() as f64;
    let rows = topology
        .ranges()
        .iter()
        .map(|range| DumpRow {
            token: range.end,
            node: range.owner.clone(),
            range_start: range.start,
            ownership: topology.range_width(range) as f64 / keyspace,
        })
        .collect();
    CommandResult::Dump(rows)
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Lookup(rows) => {
                for row in rows {
                    let nodes: Vec<&str> = row.nodes.iter().map(NodeId::as_str).collect();
                    writeln!(f, "{}\t{}\t{}", row.key, row.token, nodes.join(","))?;
                }
                Ok(())
            }
            CommandResult::Distribution(report) => {
                writeln!(
                    f,
                    "{} keys over {} vnodes ({}), mean {:.1}, std dev {:.1}",
                    report.total_keys, report.vnodes, report.partitioner, report.mean, report.std_dev
                )?;
                for load in &report.nodes {
                    writeln!(
                        f,
                        "{:<16} {:>8} keys {:>6.2}%  owns {:>6.2}%",
                        load.node,
                        load.keys,
                        load.share * 100.0,
                        load.ownership * 100.0
                    )?;
                }
                Ok(())
            }
            CommandResult::Rebalance(report) => {
                writeln!(
                    f,
                    "{}: {} of {} keys moved ({:.2}%, keyspace {:.2}%)",
                    report.change,
                    report.moved_keys,
                    report.total_keys,
                    report.moved_fraction * 100.0,
                    report.expected_fraction * 100.0
                )?;
                for (pair, count) in &report.moves {
                    writeln!(f, "  {pair}: {count}")?;
                }
                Ok(())
            }
            CommandResult::Dump(rows) => {
                for row in rows {
                    writeln!(
                        f,
                        "{}  {:<16} ({}, {}]  {:.4}%",
                        row.token,
                        row.node,
                        row.range_start,
                        row.token,
                        row.ownership * 100.0
                    )?;
                }
                Ok(())
            }
        }
    }
}
