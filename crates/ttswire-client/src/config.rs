use std::time::Duration;

use crate::auth::AuthConfig;

/// Production WebSocket endpoint for binary TTS.
pub const DEFAULT_ENDPOINT: &str = "wss://openspeech.bytedance.com/api/v1/tts/ws_binary";

/// Default bound for both connect and request timeouts.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for one client connection.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint (`ws://` or `wss://`).
    pub endpoint: String,
    /// Bound on transport establishment.
    pub connect_timeout: Duration,
    /// Bound on the exchange from sending the request to the terminal frame.
    pub request_timeout: Duration,
    pub auth: AuthConfig,
}

impl ClientConfig {
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            auth,
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: DEFAULT_TIMEOUT,
            request_timeout: DEFAULT_TIMEOUT,
            auth: AuthConfig::default(),
        }
    }
}
