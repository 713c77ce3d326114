//! Result of placing a key's replicas.

use corelib::NodeId;

/// Nodes holding a key, primary first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaPlacement {
    /// The key's owner, as returned by a plain lookup.
    pub primary: NodeId,
    /// Further distinct nodes, in clockwise order.
    pub replicas: Vec<NodeId>,
}

impl ReplicaPlacement {
    /// Split an ordered node list into primary and replicas.
    ///
    /// Returns `None` for an empty list.
    pub fn from_nodes(mut nodes: Vec<NodeId>) -> Option<Self> {
        if nodes.is_empty() {
            return None;
        }
        let replicas = nodes.split_off(1);
        let primary = nodes.pop()?;
        Some(Self { primary, replicas })
    }

    /// Every node, primary first.
    pub fn all(&self) -> impl Iterator<Item = &NodeId> {
        std::iter::once(&self.primary).chain(self.replicas.iter())
    }

    pub fn len(&self) -> usize {
        1 + self.replicas.len()
    }

    /// Always false; a placement has at least its primary.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.all().any(|node| node == node_id)
    }
}
