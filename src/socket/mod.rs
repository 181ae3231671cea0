//! Sockets built on the matching core: a publisher that fans messages out to
//! its subscribers, and a subscriber that registers prefixes and filters what
//! it receives.

pub mod publisher;
pub mod subscriber;

pub use publisher::PubSocket;
pub use subscriber::SubSocket;
