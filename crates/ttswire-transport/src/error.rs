use std::time::Duration;

use tokio_tungstenite::tungstenite;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to establish the connection (socket, TLS or upgrade).
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        source: Box<tungstenite::Error>,
    },

    /// The connection was not established within the connect timeout.
    #[error("connect to {endpoint} timed out after {timeout:?}")]
    ConnectTimeout { endpoint: String, timeout: Duration },

    /// The endpoint URL or a request header is malformed.
    #[error("invalid connect request: {0}")]
    InvalidRequest(String),

    /// An error occurred on an established WebSocket.
    #[error("websocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),

    /// The transport has been closed.
    #[error("transport closed")]
    Closed,
}

impl From<tungstenite::Error> for TransportError {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                TransportError::Closed
            }
            other => TransportError::WebSocket(Box::new(other)),
        }
    }
}

impl TransportError {
    /// HTTP status of a rejected WebSocket upgrade, if that is what failed.
    pub fn http_status(&self) -> Option<u16> {
        let source = match self {
            TransportError::Connect { source, .. } | TransportError::WebSocket(source) => source,
            _ => return None,
        };
        match source.as_ref() {
            tungstenite::Error::Http(response) => Some(response.status().as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
