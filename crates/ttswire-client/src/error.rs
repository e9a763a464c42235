use std::time::Duration;

use crate::session::SessionState;

/// Longest vendor message shown by the `Display` impl.
const VENDOR_MESSAGE_DISPLAY_LIMIT: usize = 256;

/// Errors that can occur during a synthesis exchange.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error (socket, TLS, WebSocket).
    #[error("transport error: {0}")]
    Transport(#[from] ttswire_transport::TransportError),

    /// The connection was not established within the connect timeout.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// An inbound frame could not be decoded, or an outbound one encoded.
    #[error("protocol error: {0}")]
    Frame(#[from] ttswire_frame::FrameError),

    /// The server answered with an error frame.
    #[error("vendor error {code}: {}", truncate_for_display(.message))]
    Vendor { code: u32, message: String },

    /// No terminal frame arrived within the request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The server closed the connection before the terminal frame.
    #[error("connection closed before completion ({chunks} audio chunks received)")]
    PrematureClose { chunks: usize },

    /// The HMAC-SHA256 scheme was selected without a secret key.
    #[error("HMAC-SHA256 auth requires a secret key")]
    MissingSecretKey,

    /// The speed ratio cannot be sent: JSON has no NaN or infinity.
    #[error("speed ratio must be a positive finite number, got {0}")]
    InvalidSpeedRatio(f64),

    /// JSON serialization error while building the request.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The operation is not valid in the current session state.
    #[error("invalid session state: expected {expected:?}, found {actual:?}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },
}

fn truncate_for_display(message: &str) -> &str {
    if message.len() <= VENDOR_MESSAGE_DISPLAY_LIMIT {
        return message;
    }
    let mut end = VENDOR_MESSAGE_DISPLAY_LIMIT;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    &message[..end]
}

pub type Result<T> = std::result::Result<T, ClientError>;
