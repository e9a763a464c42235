use bytes::{Bytes, BytesMut};
use ttswire_frame::{Message, MsgType};

use crate::error::{ClientError, Result};

/// Lifecycle of one client connection.
///
/// `Idle -> Connecting -> Connected -> AwaitingResponse -> Completed | Failed`,
/// with `Closed` reachable from every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    AwaitingResponse,
    Completed,
    Failed,
    Closed,
}

/// Audio chunks received during one request, in arrival order.
#[derive(Debug, Default)]
pub struct AudioAccumulator {
    chunks: Vec<(i32, Bytes)>,
    total_bytes: usize,
}

impl AudioAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sequence: i32, payload: Bytes) {
        if let Some((last, _)) = self.chunks.last() {
            if sequence >= 0 && sequence < *last {
                tracing::warn!(sequence, previous = *last, "audio chunk arrived out of order");
            }
        }
        self.total_bytes += payload.len();
        self.chunks.push((sequence, payload));
    }

    /// Number of chunks received so far.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Concatenate all chunks, consuming the accumulator.
    pub fn finish(self) -> Bytes {
        let mut audio = BytesMut::with_capacity(self.total_bytes);
        for (_, chunk) in self.chunks {
            audio.extend_from_slice(&chunk);
        }
        audio.freeze()
    }
}

/// What the exchange should do after an inbound frame.
#[derive(Debug)]
pub enum FrameAction {
    /// Keep reading frames.
    Continue,
    /// Not audio and not an error; hand to observers.
    Notify(Message),
    /// The terminal audio frame arrived.
    Complete,
}

/// Classify one decoded inbound frame, appending audio to `audio`.
///
/// Error frames are returned as [`ClientError::Vendor`].
pub fn handle_frame(message: Message, audio: &mut AudioAccumulator) -> Result<FrameAction> {
    match message.msg_type {
        MsgType::Error => {
            let text = String::from_utf8_lossy(&message.payload).into_owned();
            tracing::warn!(code = message.error_code, message = %text, "vendor error frame");
            Err(ClientError::Vendor {
                code: message.error_code,
                message: text,
            })
        }
        MsgType::FrontEndResultServer => Ok(FrameAction::Continue),
        MsgType::AudioOnlyServer => {
            let terminal = message.is_terminal_audio();
            audio.push(message.sequence, message.payload);
            if terminal {
                Ok(FrameAction::Complete)
            } else {
                Ok(FrameAction::Continue)
            }
        }
        _ => Ok(FrameAction::Notify(message)),
    }
}
