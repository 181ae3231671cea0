//! Client representation
//!
//! `Client` models one connected peer as seen by the side that writes to it.
//! It holds the sending half of a bounded per-peer queue: when the queue is
//! full the frame is dropped for that peer only, which is what gives slow
//! subscribers at-most-once, non-blocking delivery.

use tokio::sync::mpsc::{self, Receiver, Sender, error::TrySendError};
use tracing::debug;
use uuid::Uuid;

use super::connection::{Connection, Frame, SendStatus};

#[derive(Debug, Clone)]
pub struct Client {
    pub id: String,
    pub sender: Sender<Frame>,
}

impl Client {
    /// Create a new client with a sender channel. The `id` is a UUID used
    /// to identify the peer across dispatcher operations.
    pub fn new(sender: Sender<Frame>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
        }
    }
}

impl Connection for Client {
    fn id(&self) -> &str {
        &self.id
    }

    fn send(&self, frame: Frame) -> SendStatus {
        match self.sender.try_send(frame) {
            Ok(()) => SendStatus::Accepted,
            Err(TrySendError::Full(_)) => {
                debug!(client = %self.id, "outbound queue full, frame dropped");
                SendStatus::Dropped
            }
            Err(TrySendError::Closed(_)) => {
                debug!(client = %self.id, "peer gone, frame dropped");
                SendStatus::Dropped
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// A bounded queue toward one peer. A capacity of zero is raised to one.
pub fn pipe(capacity: usize) -> (Client, Receiver<Frame>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Client::new(tx), rx)
}
