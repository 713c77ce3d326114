//! XXH32 partitioner for a 32-bit keyspace.

use xxhash_rust::xxh32::xxh32;

use crate::partitioner::traits::Partitioner;
use crate::token::Token;

const SEED: u32 = 0;

/// 32-bit partitioner backed by XXH32. Tokens fall in `[0, 2^32)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh32Partitioner;

impl Partitioner for Xxh32Partitioner {
    fn partition(&self, key: &[u8]) -> Token {
        Token(u64::from(xxh32(key, SEED)))
    }

    fn max_token(&self) -> Token {
        Token(u64::from(u32::MAX))
    }

    fn name(&self) -> &'static str {
        "Xxh32Partitioner"
    }
}
