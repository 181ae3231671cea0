//! # subfan
//!
//! `subfan` is the subscription-matching and fan-out core of a PUB/SUB
//! messaging transport. Subscribers register byte-prefix subscriptions with
//! a publisher through small control frames; the publisher keeps one
//! refcounted prefix trie per subscriber and forwards each published message
//! only to the subscribers whose subscriptions match its topic. Invert
//! matching flips that decision, delivering to subscribers whose
//! subscriptions do *not* match.
//!
//! ## Core Modules
//!
//! - `broker`: the prefix trie, the match policy, per-peer channels and the fan-out dispatcher.
//! - `client`: the `Connection` seam the dispatcher writes through, with queue-backed implementations.
//! - `config`: layered settings (defaults, file, `SUBFAN_*` environment).
//! - `socket`: publisher and subscriber sockets built on the core.
//! - `transport`: control/data frame codecs, the in-process binding and the WebSocket binding.
//! - `utils`: error types and logging setup.

pub mod broker;
pub mod client;
pub mod config;
pub mod socket;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;
