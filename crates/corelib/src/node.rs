//! Node identities for the consistent hash ring.
//!
//! A node is an opaque physical identity, usually a hostname or an address.
//! The ring never interprets it beyond hashing its bytes.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier of a physical node.
///
/// Backed by an `Arc<str>` so the many virtual nodes that point at the same
/// physical node share one allocation and clones stay cheap.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Construct a node id from any string-like value.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display_and_eq() {
        let id = NodeId::from("10.0.0.1:7000");
        assert_eq!(id.to_string(), "10.0.0.1:7000");
        assert_eq!(id, "10.0.0.1:7000");
        assert_eq!(id, NodeId::new(String::from("10.0.0.1:7000")));
    }

    #[test]
    fn test_node_id_serde_transparent() {
        let id = NodeId::from("A");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"A\"");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
