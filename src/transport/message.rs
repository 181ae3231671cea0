//! Wire formats
//!
//! Control frames (subscriber to publisher) are byte-exact and shared by every
//! transport:
//!
//! | byte 0                                   | bytes 1..N       |
//! |------------------------------------------|------------------|
//! | `0x00` = unsubscribe, `0x01` = subscribe | raw topic bytes  |
//!
//! The topic length is implied by the frame length. An empty topic is valid
//! and subscribes to everything.
//!
//! Data frames only exist on stream transports that cannot carry a
//! `Message` as a value (the WebSocket binding): a big-endian `u32` topic
//! length, the topic, then the payload up to the end of the frame.

use bytes::{BufMut, Bytes, BytesMut};

use crate::broker::message::Message;
use crate::utils::error::ProtocolError;

pub const UNSUBSCRIBE_TAG: u8 = 0x00;
pub const SUBSCRIBE_TAG: u8 = 0x01;

const TOPIC_LEN_BYTES: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlFrame {
    Subscribe(Bytes),
    Unsubscribe(Bytes),
}

impl ControlFrame {
    pub fn topic(&self) -> &Bytes {
        match self {
            ControlFrame::Subscribe(topic) | ControlFrame::Unsubscribe(topic) => topic,
        }
    }

    pub fn encode(&self) -> Bytes {
        let (tag, topic) = match self {
            ControlFrame::Subscribe(topic) => (SUBSCRIBE_TAG, topic),
            ControlFrame::Unsubscribe(topic) => (UNSUBSCRIBE_TAG, topic),
        };
        let mut buf = BytesMut::with_capacity(1 + topic.len());
        buf.put_u8(tag);
        buf.put_slice(topic);
        buf.freeze()
    }

    /// Decode one control frame. The topic is sliced out of `frame` without copying.
    pub fn decode(frame: Bytes) -> Result<Self, ProtocolError> {
        let Some(&tag) = frame.first() else {
            return Err(ProtocolError::EmptyFrame);
        };
        let topic = frame.slice(1..);
        match tag {
            SUBSCRIBE_TAG => Ok(ControlFrame::Subscribe(topic)),
            UNSUBSCRIBE_TAG => Ok(ControlFrame::Unsubscribe(topic)),
            other => Err(ProtocolError::UnknownTag(other)),
        }
    }
}

pub fn encode_message(msg: &Message) -> Bytes {
    let topic_len =
        u32::try_from(msg.topic.len()).expect("topic longer than u32::MAX bytes");
    let mut buf = BytesMut::with_capacity(TOPIC_LEN_BYTES + msg.topic.len() + msg.payload.len());
    buf.put_u32(topic_len);
    buf.put_slice(&msg.topic);
    buf.put_slice(&msg.payload);
    buf.freeze()
}

pub fn decode_message(frame: Bytes) -> Result<Message, ProtocolError> {
    if frame.len() < TOPIC_LEN_BYTES {
        return Err(ProtocolError::TruncatedMessage {
            expected: TOPIC_LEN_BYTES,
            actual: frame.len(),
        });
    }
    let mut len_bytes = [0u8; TOPIC_LEN_BYTES];
    len_bytes.copy_from_slice(&frame[..TOPIC_LEN_BYTES]);
    let topic_end = TOPIC_LEN_BYTES + u32::from_be_bytes(len_bytes) as usize;
    if frame.len() < topic_end {
        return Err(ProtocolError::TruncatedMessage {
            expected: topic_end,
            actual: frame.len(),
        });
    }

    Ok(Message {
        topic: frame.slice(TOPIC_LEN_BYTES..topic_end),
        payload: frame.slice(topic_end..),
    })
}
