//! Delivery decision
//!
//! Invert matching does not subscribe a peer to the complement of its topics:
//! it flips the delivery decision of whichever socket applies it. A publisher
//! and its subscribers therefore have to agree on the flag. With only the
//! publisher inverted, subscribers that filter locally discard what the
//! publisher sends them; nothing in the protocol can detect this.

use super::trie::SubscriptionTrie;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchPolicy {
    invert: bool,
}

impl MatchPolicy {
    pub const NORMAL: Self = Self { invert: false };
    pub const INVERTED: Self = Self { invert: true };

    pub fn new(invert: bool) -> Self {
        Self { invert }
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// `trie.matches(topic) XOR invert`.
    pub fn deliver(&self, trie: &SubscriptionTrie, topic: &[u8]) -> bool {
        trie.matches(topic) ^ self.invert
    }
}
