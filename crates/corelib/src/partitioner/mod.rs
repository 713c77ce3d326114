//! Partitioner abstraction for consistent hashing.
//!
//! Partitioners are responsible for converting keys, and virtual node
//! labels, into tokens that can be placed on the hash ring. The choice is
//! fixed when a ring is constructed.

pub mod sip;
pub mod traits;
pub mod xxh3;
pub mod xxh32;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use sip::SipPartitioner;
pub use traits::Partitioner;
pub use xxh3::Xxh3Partitioner;
pub use xxh32::Xxh32Partitioner;

/// Named partitioner choice, for configuration files and command lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionerKind {
    /// [`Xxh3Partitioner`]
    #[default]
    Xxh3,
    /// [`Xxh32Partitioner`]
    Xxh32,
    /// [`SipPartitioner`]
    Sip,
}

impl PartitionerKind {
    /// Instantiate the partitioner.
    pub fn build(self) -> Arc<dyn Partitioner> {
        match self {
            PartitionerKind::Xxh3 => Arc::new(Xxh3Partitioner),
            PartitionerKind::Xxh32 => Arc::new(Xxh32Partitioner),
            PartitionerKind::Sip => Arc::new(SipPartitioner),
        }
    }
}

impl fmt::Display for PartitionerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PartitionerKind::Xxh3 => "xxh3",
            PartitionerKind::Xxh32 => "xxh32",
            PartitionerKind::Sip => "sip",
        };
        f.write_str(name)
    }
}

impl FromStr for PartitionerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xxh3" => Ok(PartitionerKind::Xxh3),
            "xxh32" => Ok(PartitionerKind::Xxh32),
            "sip" | "siphash" => Ok(PartitionerKind::Sip),
            other => Err(format!("unknown partitioner `{other}` (expected xxh3, xxh32 or sip)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partitioners_are_deterministic() {
        for kind in [PartitionerKind::Xxh3, PartitionerKind::Xxh32, PartitionerKind::Sip] {
            let a = kind.build();
            let b = kind.build();
            assert_eq!(a.partition(b"user:123"), b.partition(b"user:123"), "{kind}");
            assert_ne!(a.partition(b"node:0"), a.partition(b"node:1"), "{kind}");
        }
    }

    #[test]
    fn test_xxh32_stays_in_32_bit_keyspace() {
        let p = Xxh32Partitioner;
        for i in 0..1_000 {
            let token = p.partition(format!("key-{i}").as_bytes());
            assert!(token <= p.max_token());
        }
        assert_eq!(p.keyspace_size(), 1u128 << 32);
    }

    #[test]
    fn test_keyspace_size_64_bit() {
        assert_eq!(Xxh3Partitioner.keyspace_size(), 1u128 << 64);
        assert_eq!(SipPartitioner.keyspace_size(), 1u128 << 64);
    }

    #[test]
    fn test_kind_parse_roundtrip() {
        for kind in [PartitionerKind::Xxh3, PartitionerKind::Xxh32, PartitionerKind::Sip] {
            assert_eq!(kind.to_string().parse::<PartitionerKind>(), Ok(kind));
        }
        assert!("md5".parse::<PartitionerKind>().is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(PartitionerKind::Xxh3.build().name(), "Xxh3Partitioner");
        assert_eq!(PartitionerKind::Xxh32.build().name(), "Xxh32Partitioner");
        assert_eq!(PartitionerKind::Sip.build().name(), "SipPartitioner");
    }
}
