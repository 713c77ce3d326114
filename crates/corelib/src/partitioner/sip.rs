//! SipHash partitioner.

use std::hash::Hasher;

use siphasher::sip::SipHasher13;

use crate::partitioner::traits::Partitioner;
use crate::token::Token;

/// 64-bit partitioner backed by SipHash-1-3 with fixed zero keys.
///
/// The keys are fixed so tokens are stable across processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SipPartitioner;

impl Partitioner for SipPartitioner {
    fn partition(&self, key: &[u8]) -> Token {
        let mut hasher = SipHasher13::new_with_keys(0, 0);
        hasher.write(key);
        Token(hasher.finish())
    }

    fn max_token(&self) -> Token {
        Token(u64::MAX)
    }

    fn name(&self) -> &'static str {
        "SipPartitioner"
    }
}
