//! Publishing socket
//!
//! `PubSocket` wraps a `FanoutDispatcher` together with the control queue of
//! every attached subscriber. Control frames are drained and applied, in
//! arrival order per peer, right before each publish, so a message is always
//! matched against every subscription change sent before the publish call.
//! A peer whose control queue closes, or that sends a malformed frame, is
//! detached.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{info, warn};

use crate::broker::{ChannelId, DeliveryReport, DispatchStats, FanoutDispatcher, Message};
use crate::client::{Connection, Frame};
use crate::config::SocketSettings;

#[derive(Debug)]
pub struct PubSocket {
    dispatcher: FanoutDispatcher,
    inboxes: HashMap<ChannelId, UnboundedReceiver<Frame>>,
}

impl Default for PubSocket {
    fn default() -> Self {
        Self::new(&SocketSettings::default())
    }
}

impl PubSocket {
    pub fn new(settings: &SocketSettings) -> Self {
        Self {
            dispatcher: FanoutDispatcher::new(settings),
            inboxes: HashMap::new(),
        }
    }

    /// A subscriber connected: `connection` carries matched messages to it,
    /// `inbox` carries its control frames to us.
    pub fn attach(
        &mut self,
        connection: Arc<dyn Connection>,
        inbox: UnboundedReceiver<Frame>,
    ) -> ChannelId {
        let id = self.dispatcher.attach(connection);
        self.inboxes.insert(id.clone(), inbox);
        id
    }

    /// A subscriber disconnected. Its subscriptions go with it.
    pub fn detach(&mut self, id: &ChannelId) -> bool {
        self.inboxes.remove(id);
        self.dispatcher.detach(id)
    }

    pub fn set_invert_matching(&mut self, invert: bool) {
        self.dispatcher.set_invert_matching(invert);
    }

    pub fn invert_matching(&self) -> bool {
        self.dispatcher.invert_matching()
    }

    /// Apply every pending control frame. Returns how many were applied.
    pub fn process_control(&mut self) -> usize {
        let mut applied = 0;
        let mut terminated = Vec::new();

        for (id, inbox) in self.inboxes.iter_mut() {
            loop {
                match inbox.try_recv() {
                    Ok(Frame::Control(frame)) => match self.dispatcher.handle_frame(id, frame) {
                        Ok(_) => applied += 1,
                        Err(e) => {
                            warn!(channel = %id, error = %e, "terminating subscriber");
                            terminated.push(id.clone());
                            break;
                        }
                    },
                    Ok(Frame::Message(msg)) => {
                        warn!(channel = %id, topic = ?msg.topic, "subscriber sent a data message, ignored");
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        info!(channel = %id, "subscriber disconnected");
                        terminated.push(id.clone());
                        break;
                    }
                }
            }
        }

        for id in terminated {
            self.detach(&id);
        }
        applied
    }

    pub fn publish(&mut self, topic: impl Into<Bytes>, payload: impl Into<Bytes>) -> DeliveryReport {
        self.send(&Message::new(topic, payload))
    }

    pub fn send(&mut self, message: &Message) -> DeliveryReport {
        self.process_control();
        self.dispatcher.publish(message)
    }

    pub fn channel_count(&self) -> usize {
        self.dispatcher.len()
    }

    pub fn dispatcher(&self) -> &FanoutDispatcher {
        &self.dispatcher
    }

    pub fn stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }
}
