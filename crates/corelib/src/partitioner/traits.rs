//! Core partitioner trait definitions.

use std::fmt::Debug;

use crate::token::Token;

/// A partitioner maps arbitrary bytes onto a ring position.
///
/// Implementations must be deterministic across calls and across process
/// restarts: no per-process random seed. Independent processes rebuilding
/// the same ring rely on this.
pub trait Partitioner: Send + Sync + Debug + 'static {
    /// Converts a key into a token.
    fn partition(&self, key: &[u8]) -> Token;

    /// Returns the minimum token value for this partitioner.
    fn min_token(&self) -> Token {
        Token::MIN
    }

    /// Returns the maximum token value for this partitioner.
    fn max_token(&self) -> Token;

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;

    /// Number of distinct positions in this partitioner's keyspace.
    fn keyspace_size(&self) -> u128 {
        u128::from(self.max_token().0 - self.min_token().0) + 1
    }
}
