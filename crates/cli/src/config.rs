//! Command-line configuration.
//!
//! Ring parameters come from an optional JSON file (see
//! [`corelib::RingConfig`]); `--partitioner` and `--replicas` override it.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use corelib::ring::{HashRing, RingBuilder};
use corelib::{PartitionerKind, RingConfig};
use tracing::{debug, Level};

use crate::commands::Command;

/// Inspect and exercise a consistent hash ring.
#[derive(Debug, Parser)]
#[command(name = "ring", version)]
pub struct CliConfig {
    /// JSON file with ring settings.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Hash function: xxh3, xxh32 or sip.
    #[arg(long, global = true)]
    pub partitioner: Option<PartitionerKind>,

    /// Virtual nodes per physical node.
    #[arg(long, global = true)]
    pub replicas: Option<usize>,

    /// Comma-separated node ids to start the ring with.
    #[arg(long, global = true, value_delimiter = ',', default_values = ["A", "B", "C"])]
    pub nodes: Vec<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// More logging (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Ring settings after applying file values and flag overrides.
    pub fn ring_config(&self) -> anyhow::Result<RingConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("parsing ring config {}", path.display()))?
            }
            None => RingConfig::default(),
        };
        if let Some(partitioner) = self.partitioner {
            config.partitioner = partitioner;
        }
        if let Some(replicas) = self.replicas {
            config.default_replica_factor = replicas;
        }
        config.validate()?;
        Ok(config)
    }

    /// Build the starting ring from `--nodes`.
    pub fn build_ring(&self, config: &RingConfig) -> anyhow::Result<HashRing> {
        let builder = self
            .nodes
            .iter()
            .filter(|node| !node.is_empty())
            .fold(RingBuilder::from_config(config.clone()), |builder, node| builder.add_node(node.as_str()));
        builder.build().context("building ring from --nodes")
    }

    pub fn run(self) -> anyhow::Result<()> {
        init_tracing(self.verbose);

        let ring_config = self.ring_config()?;
        debug!(?ring_config, nodes = ?self.nodes, "starting");
        let ring = self.build_ring(&ring_config)?;

        let result = self.command.execute(&ring)?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print!("{result}");
        }
        Ok(())
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}
