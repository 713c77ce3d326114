//! Sorted storage of virtual node positions.

use crate::node::NodeId;
use crate::token::Token;
use crate::vnode::VirtualNode;

/// Ordered sequence of `(position, node)` entries.
///
/// Entries live in one contiguous `Vec` sorted strictly ascending by token,
/// so successor lookup is a binary search. A `RingStore` is never mutated in
/// place once published; membership changes build a new store.
#[derive(Debug, Clone, Default)]
pub struct RingStore {
    vnodes: Vec<VirtualNode>,
}

impl RingStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of virtual nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.vnodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vnodes.is_empty()
    }

    /// Entries in ring order.
    pub fn iter(&self) -> std::slice::Iter<'_, VirtualNode> {
        self.vnodes.iter()
    }

    pub fn as_slice(&self) -> &[VirtualNode] {
        &self.vnodes
    }

    /// Index of the first entry whose token is `>= token`, wrapping to 0
    /// when `token` is past the last entry. `None` on an empty store.
    ///
    /// O(log m) in the number of virtual nodes.
    pub fn successor_index(&self, token: Token) -> Option<usize> {
        if self.vnodes.is_empty() {
            return None;
        }
        let idx = self.vnodes.partition_point(|vnode| vnode.token < token);
        Some(if idx == self.vnodes.len() { 0 } else { idx })
    }

    /// The first entry walking clockwise from `token`, inclusive.
    pub fn successor(&self, token: Token) -> Option<&VirtualNode> {
        self.successor_index(token).map(|idx| &self.vnodes[idx])
    }

    /// Every entry exactly once, clockwise, starting at the successor of
    /// `token`.
    pub fn walk_from(&self, token: Token) -> impl Iterator<Item = &VirtualNode> {
        let start = self.successor_index(token).unwrap_or(0);
        let (before, after) = self.vnodes.split_at(start);
        after.iter().chain(before.iter())
    }

    /// Whether some entry sits exactly at `token`.
    pub fn contains_token(&self, token: Token) -> bool {
        self.find(token).is_some()
    }

    /// Owner of the entry exactly at `token`.
    pub fn owner_of(&self, token: Token) -> Option<&NodeId> {
        self.find(token).map(|idx| &self.vnodes[idx].node_id)
    }

    /// Linear check that tokens are strictly ascending.
    pub fn is_strictly_sorted(&self) -> bool {
        self.vnodes.windows(2).all(|pair| pair[0].token < pair[1].token)
    }

    /// A new store holding these entries plus `batch`.
    ///
    /// Callers must ensure no token in `batch` is already present.
    pub(crate) fn with_inserted(&self, batch: Vec<VirtualNode>) -> Self {
        let mut vnodes = Vec::with_capacity(self.vnodes.len() + batch.len());
        vnodes.extend_from_slice(&self.vnodes);
        vnodes.extend(batch);
        vnodes.sort_unstable_by_key(|vnode| vnode.token);
        Self { vnodes }
    }

    /// A new store without the entries of `node_id` at `tokens`.
    ///
    /// `tokens` must be sorted. Filtering a sorted sequence keeps it sorted.
    pub(crate) fn without_tokens(&self, node_id: &NodeId, tokens: &[Token]) -> Self {
        let vnodes = self
            .vnodes
            .iter()
            .filter(|vnode| !(vnode.node_id == *node_id && tokens.binary_search(&vnode.token).is_ok()))
            .cloned()
            .collect();
        Self { vnodes }
    }

    fn find(&self, token: Token) -> Option<usize> {
        self.vnodes.binary_search_by_key(&token, |vnode| vnode.token).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(entries: &[(u64, &str)]) -> RingStore {
        RingStore::new().with_inserted(
            entries
                .iter()
                .map(|(token, node)| VirtualNode::new(Token(*token), NodeId::from(*node), 0))
                .collect(),
        )
    }

    #[test]
    fn test_empty_store_has_no_successor() {
        let store = RingStore::new();
        assert!(store.successor(Token(5)).is_none());
        assert_eq!(store.walk_from(Token(5)).count(), 0);
    }

    #[test]
    fn test_successor_exact_and_between() {
        let store = store(&[(300, "C"), (100, "A"), (200, "B")]);
        assert!(store.is_strictly_sorted());

        assert_eq!(store.successor(Token(100)).unwrap().node_id, "A");
        assert_eq!(store.successor(Token(101)).unwrap().node_id, "B");
        assert_eq!(store.successor(Token(0)).unwrap().node_id, "A");
        assert_eq!(store.successor(Token(300)).unwrap().node_id, "C");
    }

    #[test]
    fn test_successor_wraps_past_last_position() {
        let store = store(&[(100, "A"), (200, "B"), (300, "C")]);
        assert_eq!(store.successor(Token(301)).unwrap().node_id, "A");
        assert_eq!(store.successor(Token(u64::MAX)).unwrap().node_id, "A");
    }

    #[test]
    fn test_walk_from_visits_every_entry_clockwise() {
        let store = store(&[(100, "A"), (200, "B"), (300, "C")]);
        let order: Vec<&str> = store.walk_from(Token(250)).map(|v| v.node_id.as_str()).collect();
        assert_eq!(order, ["C", "A", "B"]);
    }

    #[test]
    fn test_without_tokens_only_removes_matching_owner() {
        let store = store(&[(100, "A"), (200, "B"), (300, "A")]);
        let filtered = store.without_tokens(&NodeId::from("A"), &[Token(100), Token(300)]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.owner_of(Token(200)).unwrap(), "B");

        // Tokens owned by someone else are left alone.
        let untouched = store.without_tokens(&NodeId::from("A"), &[Token(200)]);
        assert_eq!(untouched.len(), 3);
    }

    #[test]
    fn test_contains_and_owner_of() {
        let store = store(&[(100, "A"), (200, "B")]);
        assert!(store.contains_token(Token(200)));
        assert!(!store.contains_token(Token(150)));
        assert_eq!(store.owner_of(Token(100)).unwrap(), "A");
        assert!(store.owner_of(Token(150)).is_none());
    }
}
