//! The `transport` module carries the subscription protocol between sockets.
//!
//! It defines the control and data frame formats, the in-process binding
//! used when publisher and subscriber share a process, and a WebSocket
//! binding for everything else.

pub mod inproc;
pub mod message;
pub mod websocket;
