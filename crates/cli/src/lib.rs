//! CLI tool for exercising consistent hash rings.
//!
//! Provides commands for:
//! - Looking up key owners and replica sets
//! - Reporting key distribution across nodes
//! - Measuring how many keys move when a node joins or leaves
//! - Dumping ring positions

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
