//! Subscribing socket
//!
//! `SubSocket` keeps its own subscription trie. Every local subscribe and
//! unsubscribe is mirrored to all attached publishers as a control frame, and
//! a publisher attached later is sent the current subscriptions, once per
//! reference, so its channel trie ends up identical to ours.
//!
//! Incoming messages are checked again against the local trie and the local
//! invert flag (unless `local_filter` is off). This is why invert matching has
//! to be enabled on both ends: an inverted publisher sends exactly what a
//! non-inverted subscriber throws away.
//!
//! The socket never keeps a live sender to its own receive queue once a
//! publisher holds one, so `recv` returns `None` after every publisher is
//! gone.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc::{Receiver, Sender, WeakSender};
use tracing::{debug, info, warn};

use crate::broker::{MatchPolicy, Message, Removal, SubscriptionTrie};
use crate::client::{Client, Connection, Frame, SendStatus, pipe};
use crate::config::SocketSettings;
use crate::transport::message::ControlFrame;

#[derive(Debug)]
pub struct SubSocket {
    subscriptions: SubscriptionTrie,
    policy: MatchPolicy,
    local_filter: bool,
    upstreams: Vec<Arc<dyn Connection>>,
    id: String,
    receiver: Receiver<Frame>,
    /// Held until the first publisher attaches; an unconnected socket is
    /// not a closed one.
    idle: Option<Sender<Frame>>,
    weak: WeakSender<Frame>,
    recv_capacity: usize,
    filtered: u64,
}

impl Default for SubSocket {
    fn default() -> Self {
        Self::new(&SocketSettings::default())
    }
}

impl SubSocket {
    pub fn new(settings: &SocketSettings) -> Self {
        let (inbound, receiver) = pipe(settings.recv_capacity);
        Self {
            subscriptions: SubscriptionTrie::new(),
            policy: MatchPolicy::new(settings.invert_matching),
            local_filter: settings.local_filter,
            upstreams: Vec::new(),
            id: inbound.id,
            receiver,
            weak: inbound.sender.downgrade(),
            idle: Some(inbound.sender),
            recv_capacity: settings.recv_capacity,
            filtered: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The connection a publisher writes matched messages to. The receive
    /// queue stays open for as long as one of these is alive.
    pub fn inbound(&mut self) -> Arc<dyn Connection> {
        let sender = match self.idle.take().or_else(|| self.weak.upgrade()) {
            Some(sender) => sender,
            None => self.reopen(),
        };
        Arc::new(Client {
            id: self.id.clone(),
            sender,
        })
    }

    // Every publisher left and the queue closed. Start a new one, carrying
    // over whatever was not read yet.
    fn reopen(&mut self) -> Sender<Frame> {
        let (inbound, receiver) = pipe(self.recv_capacity);
        let mut closed = std::mem::replace(&mut self.receiver, receiver);
        while let Ok(frame) = closed.try_recv() {
            let _ = inbound.sender.try_send(frame);
        }
        self.weak = inbound.sender.downgrade();
        debug!(subscriber = %self.id, "receive queue reopened");
        inbound.sender
    }

    /// Start mirroring subscriptions to a publisher.
    pub fn attach(&mut self, upstream: Arc<dyn Connection>) {
        for (topic, count) in self.subscriptions.subscriptions() {
            let frame = Frame::Control(ControlFrame::Subscribe(Bytes::from(topic)).encode());
            for _ in 0..count {
                if upstream.send(frame.clone()) == SendStatus::Dropped {
                    warn!(upstream = upstream.id(), "publisher gone while replaying subscriptions");
                    return;
                }
            }
        }
        debug!(
            upstream = upstream.id(),
            subscriptions = self.subscriptions.len(),
            "publisher attached"
        );
        self.upstreams.push(upstream);
    }

    pub fn subscribe(&mut self, topic: impl Into<Bytes>) {
        let topic = topic.into();
        self.subscriptions.add(&topic);
        self.send_upstream(ControlFrame::Subscribe(topic));
    }

    /// Drop one reference to `topic`. Returns `false`, and tells no publisher,
    /// when the topic was not subscribed.
    pub fn unsubscribe(&mut self, topic: impl Into<Bytes>) -> bool {
        let topic = topic.into();
        match self.subscriptions.remove(&topic) {
            Removal::Removed { .. } => {
                self.send_upstream(ControlFrame::Unsubscribe(topic));
                true
            }
            Removal::NotFound => {
                debug!(topic = ?topic, "unsubscribe for unknown topic ignored");
                false
            }
        }
    }

    /// Local only: publishers are not told. Set the same flag on the publisher.
    pub fn set_invert_matching(&mut self, invert: bool) {
        self.policy = MatchPolicy::new(invert);
    }

    pub fn invert_matching(&self) -> bool {
        self.policy.is_inverted()
    }

    pub fn subscriptions(&self) -> &SubscriptionTrie {
        &self.subscriptions
    }

    /// Publishers still reachable.
    pub fn upstream_count(&self) -> usize {
        self.upstreams.iter().filter(|u| !u.is_closed()).count()
    }

    /// Messages discarded by the local filter so far.
    pub fn filtered(&self) -> u64 {
        self.filtered
    }

    /// Next accepted message if one is already queued.
    pub fn try_recv(&mut self) -> Option<Message> {
        while let Ok(frame) = self.receiver.try_recv() {
            if let Some(msg) = self.accept(frame) {
                return Some(msg);
            }
        }
        None
    }

    /// Wait for the next accepted message. `None` once every publisher is gone
    /// and the queue is drained.
    pub async fn recv(&mut self) -> Option<Message> {
        while let Some(frame) = self.receiver.recv().await {
            if let Some(msg) = self.accept(frame) {
                return Some(msg);
            }
        }
        None
    }

    /// `None` when nothing acceptable arrived within `timeout`.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Option<Message> {
        tokio::time::timeout(timeout, self.recv())
            .await
            .ok()
            .flatten()
    }

    fn accept(&mut self, frame: Frame) -> Option<Message> {
        match frame {
            Frame::Message(msg) => {
                if !self.local_filter || self.policy.deliver(&self.subscriptions, &msg.topic) {
                    Some(msg)
                } else {
                    self.filtered += 1;
                    debug!(topic = ?msg.topic, "message rejected by local filter");
                    None
                }
            }
            Frame::Control(_) => {
                warn!("control frame on subscriber inbound queue ignored");
                None
            }
        }
    }

    // Upstreams only report Dropped once the publisher is gone.
    fn send_upstream(&mut self, frame: ControlFrame) {
        let frame = Frame::Control(frame.encode());
        self.upstreams
            .retain(|upstream| match upstream.send(frame.clone()) {
                SendStatus::Accepted => true,
                SendStatus::Dropped => {
                    info!(upstream = upstream.id(), "publisher gone, upstream released");
                    false
                }
            });
    }
}
