//! XXH3 partitioner, the default.

use xxhash_rust::xxh3::xxh3_64;

use crate::partitioner::traits::Partitioner;
use crate::token::Token;

/// 64-bit partitioner backed by XXH3 with the default secret.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh3Partitioner;

impl Partitioner for Xxh3Partitioner {
    fn partition(&self, key: &[u8]) -> Token {
        Token(xxh3_64(key))
    }

    fn max_token(&self) -> Token {
        Token(u64::MAX)
    }

    fn name(&self) -> &'static str {
        "Xxh3Partitioner"
    }
}
