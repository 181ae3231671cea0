//! Per-peer subscription state on the publishing side.
//!
//! A `SubscriptionChannel` pairs the connection to one subscriber with the
//! trie of prefixes that subscriber asked for and the invert flag in force on
//! this edge. It is created when the peer connects and dropped, subscriptions
//! and all, when it disconnects.

use std::sync::Arc;

use tracing::debug;

use crate::client::{Connection, Frame, SendStatus};
use crate::transport::message::ControlFrame;

use super::message::Message;
use super::policy::MatchPolicy;
use super::trie::{Removal, SubscriptionTrie};

pub type ChannelId = String;

/// What applying one control frame did to a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Subscribed,
    Unsubscribed,
    /// Unsubscribe for a prefix the channel never held. Not an error.
    Ignored,
}

#[derive(Debug)]
pub struct SubscriptionChannel {
    id: ChannelId,
    connection: Arc<dyn Connection>,
    subscriptions: SubscriptionTrie,
    policy: MatchPolicy,
    removals_since_prune: usize,
}

impl SubscriptionChannel {
    pub fn new(connection: Arc<dyn Connection>, invert: bool) -> Self {
        Self {
            id: connection.id().to_string(),
            connection,
            subscriptions: SubscriptionTrie::new(),
            policy: MatchPolicy::new(invert),
            removals_since_prune: 0,
        }
    }

    pub fn id(&self) -> &ChannelId {
        &self.id
    }

    pub fn subscriptions(&self) -> &SubscriptionTrie {
        &self.subscriptions
    }

    pub fn is_inverted(&self) -> bool {
        self.policy.is_inverted()
    }

    pub fn set_invert_matching(&mut self, invert: bool) {
        self.policy = MatchPolicy::new(invert);
    }

    /// Apply a decoded control frame to this channel's trie.
    ///
    /// `prune_threshold` removals trigger a sweep of dead trie nodes; `0`
    /// disables sweeping.
    pub fn apply(&mut self, frame: &ControlFrame, prune_threshold: usize) -> FrameOutcome {
        match frame {
            ControlFrame::Subscribe(topic) => {
                self.subscriptions.add(topic);
                debug!(channel = %self.id, topic = ?topic, "subscribed");
                FrameOutcome::Subscribed
            }
            ControlFrame::Unsubscribe(topic) => match self.subscriptions.remove(topic) {
                Removal::Removed { remaining } => {
                    debug!(channel = %self.id, topic = ?topic, remaining, "unsubscribed");
                    self.removals_since_prune += 1;
                    if prune_threshold > 0 && self.removals_since_prune >= prune_threshold {
                        let freed = self.subscriptions.prune();
                        debug!(channel = %self.id, freed, "pruned subscription trie");
                        self.removals_since_prune = 0;
                    }
                    FrameOutcome::Unsubscribed
                }
                Removal::NotFound => {
                    debug!(channel = %self.id, topic = ?topic, "unsubscribe for unknown topic ignored");
                    FrameOutcome::Ignored
                }
            },
        }
    }

    /// Whether this channel's peer should receive a message on `topic`.
    pub fn wants(&self, topic: &[u8]) -> bool {
        self.policy.deliver(&self.subscriptions, topic)
    }

    pub fn forward(&self, message: &Message) -> SendStatus {
        self.connection.send(Frame::Message(message.clone()))
    }
}
