//! subfan matching core
//!
//! The broker module decides which peers receive a published message:
//! - `trie`: refcounted prefix trie of subscribed topics
//! - `policy`: the match/invert delivery decision
//! - `channel`: per-peer subscription state on the publishing side
//! - `engine`: the dispatcher that owns the channels and fans messages out

pub mod channel;
pub mod engine;
pub mod message;
pub mod policy;
pub mod trie;

pub use channel::{ChannelId, FrameOutcome, SubscriptionChannel};
pub use engine::{DispatchStats, FanoutDispatcher};
pub use message::{DeliveryReport, Message};
pub use policy::MatchPolicy;
pub use trie::{Removal, SubscriptionTrie};
