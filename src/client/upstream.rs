//! The subscriber's connection toward a publisher.
//!
//! Control frames must never be lost or reordered: a dropped unsubscribe
//! would leave the publisher delivering forever. The queue is therefore
//! unbounded, and only a vanished publisher makes `send` report `Dropped`.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;
use uuid::Uuid;

use super::connection::{Connection, Frame, SendStatus};

#[derive(Debug, Clone)]
pub struct Upstream {
    pub id: String,
    sender: UnboundedSender<Frame>,
}

impl Upstream {
    pub fn new(sender: UnboundedSender<Frame>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
        }
    }

    /// An upstream connection and the receiving half the publisher drains.
    pub fn channel() -> (Self, UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Connection for Upstream {
    fn id(&self) -> &str {
        &self.id
    }

    fn send(&self, frame: Frame) -> SendStatus {
        match self.sender.send(frame) {
            Ok(()) => SendStatus::Accepted,
            Err(_) => {
                debug!(upstream = %self.id, "publisher gone, control frame dropped");
                SendStatus::Dropped
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
