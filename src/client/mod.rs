//! The `client` module defines how the matching core reaches a peer.
//!
//! It provides the `Connection` trait the core writes through, the `Client`
//! implementation (bounded queue toward a subscriber) and the `Upstream`
//! implementation (ordered, lossless control queue toward a publisher).

pub mod connection;
pub mod pubsub_client;
pub mod upstream;

pub use connection::{Connection, Frame, SendStatus};
pub use pubsub_client::{Client, pipe};
pub use upstream::Upstream;
