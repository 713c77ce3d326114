//! Ring positions.
//!
//! Tokens are positions on the circular keyspace. Every hash function in
//! [`crate::partitioner`] produces a `Token`; 32-bit functions simply leave
//! the upper half of the `u64` unused and report a smaller `max_token()`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position on the hash ring.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(pub u64);

impl Token {
    /// Start of the ring.
    pub const MIN: Token = Token(0);

    /// Numeric value of this position.
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Clockwise distance from `self` to `other`, wrapping at `u64::MAX`.
    ///
    /// Callers working in a narrower keyspace should use
    /// [`Token::distance_within`] instead.
    #[inline]
    pub fn distance_to(self, other: Token) -> u64 {
        other.0.wrapping_sub(self.0)
    }

    /// Clockwise distance from `self` to `other` in a keyspace whose
    /// largest position is `max`.
    ///
    /// Returned as `u128` since a full 64-bit keyspace has `2^64` positions.
    pub fn distance_within(self, other: Token, max: Token) -> u128 {
        if other.0 >= self.0 {
            u128::from(other.0 - self.0)
        } else {
            u128::from(max.0 - self.0) + u128::from(other.0) + 1
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Token(value)
    }
}
