//! The capability the matching core uses to talk to a peer.
//!
//! How bytes reach the peer (in-process queue, WebSocket, ...) is up to the
//! implementation. The core only needs a non-blocking enqueue that reports
//! whether the frame was taken.

use std::fmt;

use bytes::Bytes;

use crate::broker::message::Message;

/// Unit carried over a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// An encoded subscribe/unsubscribe frame, subscriber to publisher.
    Control(Bytes),
    /// A published message, publisher to subscriber.
    Message(Message),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Accepted,
    /// The peer's queue is full or the peer is gone. The frame is lost.
    Dropped,
}

pub trait Connection: Send + Sync + fmt::Debug {
    /// Identifier of the peer, unique per connection.
    fn id(&self) -> &str;

    /// Enqueue `frame` without blocking.
    fn send(&self, frame: Frame) -> SendStatus;

    /// Whether the peer is known to be gone. Implementations that cannot
    /// tell keep the default and report it through `send` instead.
    fn is_closed(&self) -> bool {
        false
    }
}
