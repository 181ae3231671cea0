//! Message definitions for the matching core.
//!
//! A `Message` is what a publisher fans out: a topic, matched byte-for-byte
//! against subscription prefixes, and an opaque payload. Both parts are
//! `Bytes`, so forwarding one message to many channels only bumps a refcount.

use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: Bytes,
    pub payload: Bytes,
}

impl Message {
    pub fn new(topic: impl Into<Bytes>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Outcome of a single publish call. Informational only: a publish never
/// fails because nobody matched or because a peer was too slow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Channels attached when the publish started.
    pub channels: usize,
    /// Channels whose match policy asked for the message.
    pub matched: usize,
    /// Matched channels whose connection accepted the message.
    pub delivered: usize,
    /// Matched channels whose connection was full or closed.
    pub dropped: usize,
}

impl DeliveryReport {
    pub fn is_empty(&self) -> bool {
        self.matched == 0
    }
}
