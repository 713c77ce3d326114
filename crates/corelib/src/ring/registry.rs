//! Live physical nodes and the positions each one owns.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::token::Token;

/// Tracks registered nodes and the ring positions placed for each.
///
/// Positions are recorded at add time so removal deletes exactly those
/// entries without rehashing anything.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: BTreeMap<NodeId, Vec<Token>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Sorted positions owned by `node_id`.
    pub fn tokens_of(&self, node_id: &str) -> Option<&[Token]> {
        self.nodes.get(node_id).map(Vec::as_slice)
    }

    /// Registered nodes, in id order.
    pub fn list_nodes(&self) -> Vec<NodeId> {
        self.nodes.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &[Token])> {
        self.nodes.iter().map(|(id, tokens)| (id, tokens.as_slice()))
    }

    /// Total positions across all nodes.
    pub fn token_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    /// A copy of this registry with `node_id` owning `tokens`.
    pub(crate) fn with_node(&self, node_id: NodeId, mut tokens: Vec<Token>) -> Result<Self> {
        if self.nodes.contains_key(&node_id) {
            return Err(Error::DuplicateNode(node_id));
        }
        tokens.sort_unstable();
        let mut nodes = self.nodes.clone();
        nodes.insert(node_id, tokens);
        Ok(Self { nodes })
    }

    /// A copy of this registry without `node_id`, plus the positions it
    /// owned.
    pub(crate) fn without_node(&self, node_id: &str) -> Result<(Self, NodeId, Vec<Token>)> {
        let mut nodes = self.nodes.clone();
        match nodes.remove_entry(node_id) {
            Some((id, tokens)) => Ok((Self { nodes }, id, tokens)),
            None => Err(Error::NodeNotFound(NodeId::new(node_id))),
        }
    }
}
