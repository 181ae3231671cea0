//! Fan-out engine
//!
//! `FanoutDispatcher` owns the channel set of one publishing socket:
//! - attaching and detaching channels as peers connect and disconnect
//! - applying subscribe/unsubscribe control frames to the right channel
//! - deciding, per published message and per channel, whether to forward
//!
//! Usage notes:
//! - The API is synchronous and `&mut self`: one owner drives a dispatcher,
//!   so control frames and publishes are naturally serialized and a publish
//!   never observes a half-applied subscription change.
//! - Forwarding is a non-blocking enqueue. A full or closed peer loses that
//!   message and nothing else; the publish call itself never fails.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::client::{Connection, SendStatus};
use crate::config::SocketSettings;
use crate::transport::message::ControlFrame;
use crate::utils::error::{Error, Result};

use super::channel::{ChannelId, FrameOutcome, SubscriptionChannel};
use super::message::{DeliveryReport, Message};

/// Running totals kept by a dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub published: u64,
    pub matched: u64,
    pub delivered: u64,
    pub dropped: u64,
    /// Publishes that reached nobody although some channel held a
    /// subscription. A steadily growing value usually means the publisher
    /// and its subscribers disagree on invert matching.
    pub zero_match_publishes: u64,
    pub ignored_unsubscribes: u64,
    pub protocol_errors: u64,
}

#[derive(Debug)]
pub struct FanoutDispatcher {
    channels: HashMap<ChannelId, SubscriptionChannel>,
    invert: bool,
    prune_threshold: usize,
    stats: DispatchStats,
}

impl Default for FanoutDispatcher {
    fn default() -> Self {
        Self::new(&SocketSettings::default())
    }
}

impl FanoutDispatcher {
    pub fn new(settings: &SocketSettings) -> Self {
        Self {
            channels: HashMap::new(),
            invert: settings.invert_matching,
            prune_threshold: settings.prune_threshold,
            stats: DispatchStats::default(),
        }
    }

    /// Create a channel for a newly connected peer. The channel starts with no
    /// subscriptions and the dispatcher's current invert flag.
    pub fn attach(&mut self, connection: Arc<dyn Connection>) -> ChannelId {
        let channel = SubscriptionChannel::new(connection, self.invert);
        let id = channel.id().clone();
        if self.channels.insert(id.clone(), channel).is_some() {
            warn!(channel = %id, "connection re-attached, previous subscriptions discarded");
        }
        info!(channel = %id, channels = self.channels.len(), "channel attached");
        id
    }

    /// Discard a disconnected peer's channel and every subscription it held.
    pub fn detach(&mut self, id: &ChannelId) -> bool {
        let removed = self.channels.remove(id).is_some();
        if removed {
            info!(channel = %id, channels = self.channels.len(), "channel detached");
        }
        removed
    }

    /// Decode and apply one control frame received from channel `id`.
    ///
    /// A malformed frame is returned as an error and leaves the channel
    /// untouched; the caller decides whether to terminate the peer.
    pub fn handle_frame(&mut self, id: &ChannelId, frame: Bytes) -> Result<FrameOutcome> {
        let Some(channel) = self.channels.get_mut(id) else {
            return Err(Error::UnknownChannel(id.clone()));
        };

        let frame = match ControlFrame::decode(frame) {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.protocol_errors += 1;
                warn!(channel = %id, error = %e, "malformed control frame");
                return Err(e.into());
            }
        };

        let outcome = channel.apply(&frame, self.prune_threshold);
        if outcome == FrameOutcome::Ignored {
            self.stats.ignored_unsubscribes += 1;
        }
        Ok(outcome)
    }

    /// Flip invert matching for every attached channel and for channels
    /// attached later.
    pub fn set_invert_matching(&mut self, invert: bool) {
        self.invert = invert;
        for channel in self.channels.values_mut() {
            channel.set_invert_matching(invert);
        }
    }

    pub fn invert_matching(&self) -> bool {
        self.invert
    }

    pub fn channel(&self, id: &ChannelId) -> Option<&SubscriptionChannel> {
        self.channels.get(id)
    }

    /// Read-only view of every attached channel, in no particular order.
    pub fn channels(&self) -> impl Iterator<Item = &SubscriptionChannel> {
        self.channels.values()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Forward `message` to every channel whose match policy accepts its topic.
    pub fn publish(&mut self, message: &Message) -> DeliveryReport {
        let mut report = DeliveryReport {
            channels: self.channels.len(),
            ..DeliveryReport::default()
        };

        for channel in self.channels.values() {
            if !channel.wants(&message.topic) {
                continue;
            }
            report.matched += 1;
            match channel.forward(message) {
                SendStatus::Accepted => report.delivered += 1,
                SendStatus::Dropped => {
                    report.dropped += 1;
                    debug!(channel = %channel.id(), topic = ?message.topic, "message dropped");
                }
            }
        }

        self.stats.published += 1;
        self.stats.matched += report.matched as u64;
        self.stats.delivered += report.delivered as u64;
        self.stats.dropped += report.dropped as u64;
        if report.is_empty()
            && self
                .channels
                .values()
                .any(|c| !c.subscriptions().is_empty())
        {
            self.stats.zero_match_publishes += 1;
            debug!(topic = ?message.topic, "publish matched no channel");
        }

        report
    }
}
