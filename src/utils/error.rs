//! The `error` module defines the error types used across `subfan`.
//!
//! Benign outcomes (unsubscribing something never subscribed, publishing to
//! nobody, a full peer queue) are plain return values elsewhere in the crate.
//! Only malformed frames and transport/configuration failures end up here.

use thiserror::Error;

/// A frame received from a peer that cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("control frame is empty, missing the subscribe/unsubscribe tag")]
    EmptyFrame,

    #[error("unknown control frame tag {0:#04x}")]
    UnknownTag(u8),

    #[error("message frame truncated: need {expected} bytes, got {actual}")]
    TruncatedMessage { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("no channel attached with id {0}")]
    UnknownChannel(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
