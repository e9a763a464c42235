use std::fmt;
use std::time::{Duration, Instant};

use bytes::Bytes;
use ttswire_frame::{decode_bytes, encode, full_client_request, Message, MsgType};
use ttswire_transport::{Duplex, TransportError, WsTransport, AUTHORIZATION};

use crate::auth::authorization_header;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::request::{RequestPayload, SynthesisRequest};
use crate::session::{handle_frame, AudioAccumulator, FrameAction, SessionState};

/// Callback for inbound frames that are neither audio nor errors.
pub type MessageObserver = Box<dyn FnMut(&Message) + Send>;

/// Result of a completed synthesis.
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    /// All audio chunks concatenated in arrival order.
    pub audio: Bytes,
    /// Number of audio frames received, the terminal one included.
    pub chunks: usize,
    /// Time from sending the request to the first audio frame.
    pub first_chunk: Option<Duration>,
    /// Time from sending the request to the terminal frame.
    pub elapsed: Duration,
}

/// Single-flight synthesis client.
///
/// One client handles one request: connect, send, collect audio until the
/// terminal frame, then close. Concurrent requests need separate clients.
pub struct TtsClient<T = WsTransport> {
    config: ClientConfig,
    transport: Option<T>,
    state: SessionState,
    observer: Option<MessageObserver>,
}

impl TtsClient<WsTransport> {
    /// Create an unconnected client.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            state: SessionState::Idle,
            observer: None,
        }
    }

    /// Open the WebSocket with the configured authorization header.
    pub async fn connect(&mut self) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(ClientError::InvalidState {
                expected: SessionState::Idle,
                actual: self.state,
            });
        }

        self.state = SessionState::Connecting;
        tracing::info!(
            endpoint = %self.config.endpoint,
            scheme = self.config.auth.scheme.name(),
            "connecting"
        );
        match open_websocket(&self.config).await {
            Ok(transport) => {
                self.transport = Some(transport);
                self.state = SessionState::Connected;
                tracing::info!(endpoint = %self.config.endpoint, "connected");
                Ok(())
            }
            Err(err) => {
                self.state = SessionState::Failed;
                Err(err)
            }
        }
    }
}

impl<T: Duplex> TtsClient<T> {
    /// Wrap an already connected transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport: Some(transport),
            state: SessionState::Connected,
            observer: None,
        }
    }

    /// Register a callback for informational frames.
    pub fn on_message(mut self, observer: impl FnMut(&Message) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Synthesize `request` and return the concatenated audio.
    ///
    /// The connection is closed when this returns, on success and on error.
    pub async fn send_request(&mut self, request: &SynthesisRequest) -> Result<Bytes> {
        self.send_request_detailed(request)
            .await
            .map(|outcome| outcome.audio)
    }

    /// Like [`TtsClient::send_request`], with chunk count and timings.
    pub async fn send_request_detailed(
        &mut self,
        request: &SynthesisRequest,
    ) -> Result<SynthesisOutcome> {
        let transport = match (self.state, self.transport.as_mut()) {
            (SessionState::Connected, Some(transport)) => transport,
            (actual, _) => {
                return Err(ClientError::InvalidState {
                    expected: SessionState::Connected,
                    actual,
                })
            }
        };

        self.state = SessionState::AwaitingResponse;
        let timeout = self.config.request_timeout;
        let exchange = exchange(
            transport,
            &self.config,
            request,
            &mut self.observer,
        );
        let result = match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(timeout)),
        };

        match &result {
            Ok(outcome) => {
                self.state = SessionState::Completed;
                tracing::info!(
                    bytes = outcome.audio.len(),
                    chunks = outcome.chunks,
                    elapsed_ms = outcome.elapsed.as_millis() as u64,
                    "audio complete"
                );
            }
            Err(err) => {
                self.state = SessionState::Failed;
                tracing::warn!(error = %err, "synthesis failed");
            }
        }

        self.close().await;
        result
    }

    /// Close the transport. Safe to call in any state and more than once.
    pub async fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            match tokio::time::timeout(self.config.connect_timeout, transport.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::debug!(error = %err, "transport close failed"),
                Err(_) => tracing::debug!("transport close timed out"),
            }
        }
        self.state = SessionState::Closed;
    }
}

impl<T> fmt::Debug for TtsClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtsClient")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("connected", &self.transport.is_some())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

async fn open_websocket(config: &ClientConfig) -> Result<WsTransport> {
    let headers = [(AUTHORIZATION.to_string(), authorization_header(&config.auth)?)];
    WsTransport::connect(&config.endpoint, &headers, config.connect_timeout)
        .await
        .map_err(|err| match err {
            TransportError::ConnectTimeout { timeout, .. } => ClientError::ConnectTimeout(timeout),
            other => ClientError::Transport(other),
        })
}

async fn exchange<T: Duplex>(
    transport: &mut T,
    config: &ClientConfig,
    request: &SynthesisRequest,
    observer: &mut Option<MessageObserver>,
) -> Result<SynthesisOutcome> {
    let payload = RequestPayload::build(&config.auth, request)?.to_vec()?;
    let wire = encode(&full_client_request(payload))?;

    let started = Instant::now();
    tracing::debug!(
        bytes = wire.len(),
        text_chars = request.text.chars().count(),
        voice = %request.voice_type,
        "sending request"
    );
    transport.send(wire).await?;

    let mut audio = AudioAccumulator::new();
    let mut first_chunk = None;
    loop {
        let Some(frame) = transport.recv().await? else {
            return Err(ClientError::PrematureClose {
                chunks: audio.len(),
            });
        };
        let message = decode_bytes(frame)?;
        tracing::debug!(%message, "frame received");

        if message.msg_type == MsgType::AudioOnlyServer && first_chunk.is_none() {
            first_chunk = Some(started.elapsed());
        }

        match handle_frame(message, &mut audio)? {
            FrameAction::Continue => {}
            FrameAction::Notify(message) => {
                if let Some(observer) = observer.as_mut() {
                    observer(&message);
                }
            }
            FrameAction::Complete => {
                let chunks = audio.len();
                return Ok(SynthesisOutcome {
                    audio: audio.finish(),
                    chunks,
                    first_chunk,
                    elapsed: started.elapsed(),
                });
            }
        }
    }
}

/// Connect, synthesize one request, and close.
pub async fn synthesize(config: ClientConfig, request: &SynthesisRequest) -> Result<Bytes> {
    synthesize_detailed(config, request)
        .await
        .map(|outcome| outcome.audio)
}

/// Like [`synthesize`], with chunk count and timings.
pub async fn synthesize_detailed(
    config: ClientConfig,
    request: &SynthesisRequest,
) -> Result<SynthesisOutcome> {
    let mut client = TtsClient::new(config);
    let result = match client.connect().await {
        Ok(()) => client.send_request_detailed(request).await,
        Err(err) => Err(err),
    };
    client.close().await;
    result
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::net::TcpListener;
    use ttswire_frame::{decode, EventType, MsgTypeFlag};
    use ttswire_transport::MemoryTransport;

    use super::*;
    use crate::auth::{AuthConfig, AuthScheme};

    fn config() -> ClientConfig {
        ClientConfig::new(AuthConfig::new("app-1", "tok"))
            .with_request_timeout(Duration::from_secs(5))
    }

    fn request() -> SynthesisRequest {
        SynthesisRequest::new("hello", "BV001_streaming")
    }

    fn audio_frame(sequence: i32, payload: &[u8]) -> Bytes {
        let flag = if sequence < 0 {
            MsgTypeFlag::NegativeSeq
        } else {
            MsgTypeFlag::PositiveSeq
        };
        let message = Message {
            sequence,
            payload: Bytes::copy_from_slice(payload),
            ..Message::new(MsgType::AudioOnlyServer, flag)
        };
        encode(&message).unwrap()
    }

    fn error_frame(code: u32, text: &str) -> Bytes {
        let message = Message {
            error_code: code,
            payload: Bytes::copy_from_slice(text.as_bytes()),
            ..Message::new(MsgType::Error, MsgTypeFlag::NoSeq)
        };
        encode(&message).unwrap()
    }

    #[tokio::test]
    async fn happy_path_concatenates_audio_and_closes() {
        let (client_end, mut server_end) = MemoryTransport::pair();
        let probe = client_end.probe();

        let server = tokio::spawn(async move {
            let wire = server_end.recv().await.unwrap().unwrap();
            let request = decode(&wire).unwrap();
            assert_eq!(request.msg_type, MsgType::FullClientRequest);
            assert_eq!(request.flag, MsgTypeFlag::NoSeq);
            let body: serde_json::Value = serde_json::from_slice(&request.payload).unwrap();
            assert_eq!(body["request"]["text"], "hello");
            assert_eq!(body["app"]["cluster"], "volcano_tts");

            server_end.send(audio_frame(0, b"A")).await.unwrap();
            server_end.send(audio_frame(1, b"B")).await.unwrap();
            server_end.send(audio_frame(-1, b"")).await.unwrap();

            assert!(server_end.recv().await.unwrap().is_none());
        });

        let mut client = TtsClient::with_transport(config(), client_end);
        let outcome = client.send_request_detailed(&request()).await.unwrap();

        assert_eq!(outcome.audio.as_ref(), b"AB");
        assert_eq!(outcome.chunks, 3);
        assert!(outcome.first_chunk.is_some());
        assert_eq!(client.state(), SessionState::Closed);
        assert!(probe.is_closed());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn vendor_error_rejects_without_audio() {
        let (client_end, mut server_end) = MemoryTransport::pair();

        let server = tokio::spawn(async move {
            server_end.recv().await.unwrap().unwrap();
            server_end
                .send(error_frame(4000, "invalid voice_type"))
                .await
                .unwrap();
            assert!(server_end.recv().await.unwrap().is_none());
        });

        let mut client = TtsClient::with_transport(config(), client_end);
        let err = client.send_request(&request()).await.unwrap_err();

        match err {
            ClientError::Vendor { code, message } => {
                assert_eq!(code, 4000);
                assert_eq!(message, "invalid voice_type");
            }
            other => panic!("expected vendor error, got {other:?}"),
        }
        assert_eq!(client.state(), SessionState::Closed);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn vendor_error_after_partial_audio_discards_audio() {
        let (client_end, mut server_end) = MemoryTransport::pair();

        let server = tokio::spawn(async move {
            server_end.recv().await.unwrap().unwrap();
            server_end.send(audio_frame(0, b"partial")).await.unwrap();
            server_end.send(error_frame(5000, "backend busy")).await.unwrap();
        });

        let mut client = TtsClient::with_transport(config(), client_end);
        let err = client.send_request(&request()).await.unwrap_err();
        assert!(matches!(err, ClientError::Vendor { code: 5000, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn request_timeout_closes_transport() {
        let (client_end, mut server_end) = MemoryTransport::pair();
        let probe = client_end.probe();

        let server = tokio::spawn(async move {
            server_end.recv().await.unwrap().unwrap();
            // Never answer; the client must give up and close.
            assert!(server_end.recv().await.unwrap().is_none());
        });

        let config = config().with_request_timeout(Duration::from_millis(100));
        let mut client = TtsClient::with_transport(config, client_end);
        let started = Instant::now();
        let err = client.send_request(&request()).await.unwrap_err();

        assert!(matches!(err, ClientError::Timeout(d) if d == Duration::from_millis(100)));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(client.state(), SessionState::Closed);
        assert!(probe.is_closed());
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server should observe close")
            .unwrap();
    }

    #[tokio::test]
    async fn premature_close_is_distinct_from_timeout() {
        let (client_end, mut server_end) = MemoryTransport::pair();

        let server = tokio::spawn(async move {
            server_end.recv().await.unwrap().unwrap();
            server_end.send(audio_frame(0, b"A")).await.unwrap();
            server_end.close().await.unwrap();
        });

        let mut client = TtsClient::with_transport(config(), client_end);
        let err = client.send_request(&request()).await.unwrap_err();

        assert!(matches!(err, ClientError::PrematureClose { chunks: 1 }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn undecodable_frame_is_protocol_error() {
        let (client_end, mut server_end) = MemoryTransport::pair();

        let server = tokio::spawn(async move {
            server_end.recv().await.unwrap().unwrap();
            server_end.send(Bytes::from_static(&[0x11, 0xB1])).await.unwrap();
        });

        let mut client = TtsClient::with_transport(config(), client_end);
        let err = client.send_request(&request()).await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Frame(ttswire_frame::FrameError::TooShort { .. })
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn informational_frames_reach_observer() {
        let (client_end, mut server_end) = MemoryTransport::pair();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let server = tokio::spawn(async move {
            server_end.recv().await.unwrap().unwrap();
            let front_end = Message::new(MsgType::FrontEndResultServer, MsgTypeFlag::NoSeq);
            server_end.send(encode(&front_end).unwrap()).await.unwrap();
            let started = Message {
                event: EventType::SessionStarted,
                session_id: "s-1".to_string(),
                payload: Bytes::from_static(b"{}"),
                ..Message::new(MsgType::FullServerResponse, MsgTypeFlag::WithEvent)
            };
            server_end.send(encode(&started).unwrap()).await.unwrap();
            server_end.send(audio_frame(-1, b"Z")).await.unwrap();
        });

        let sink = Arc::clone(&seen);
        let mut client = TtsClient::with_transport(config(), client_end).on_message(move |msg| {
            sink.lock().unwrap().push((msg.msg_type, msg.event));
        });
        let audio = client.send_request(&request()).await.unwrap();

        assert_eq!(audio.as_ref(), b"Z");
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(MsgType::FullServerResponse, EventType::SessionStarted)]
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn client_is_single_flight() {
        let (client_end, mut server_end) = MemoryTransport::pair();

        let server = tokio::spawn(async move {
            server_end.recv().await.unwrap().unwrap();
            server_end.send(audio_frame(-1, b"x")).await.unwrap();
        });

        let mut client = TtsClient::with_transport(config(), client_end);
        client.send_request(&request()).await.unwrap();
        let err = client.send_request(&request()).await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::InvalidState {
                expected: SessionState::Connected,
                actual: SessionState::Closed,
            }
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (client_end, _server_end) = MemoryTransport::pair();
        let probe = client_end.probe();
        let mut client = TtsClient::with_transport(config(), client_end);

        client.close().await;
        client.close().await;
        assert!(probe.is_closed());
        assert_eq!(client.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn connect_requires_secret_for_hmac() {
        let auth = AuthConfig::new("app-1", "tok").with_scheme(AuthScheme::HmacSha256);
        let mut client = TtsClient::new(ClientConfig::new(auth).with_endpoint("ws://127.0.0.1:1"));

        let err = client.connect().await.unwrap_err();
        assert!(matches!(err, ClientError::MissingSecretKey));
        assert_eq!(client.state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn connect_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut client = TtsClient::new(config().with_endpoint(format!("ws://{addr}")));
        let err = client.connect().await.unwrap_err();

        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(client.state(), SessionState::Failed);
    }

    #[tokio::test]
    async fn connect_timeout_is_distinct() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let config = config()
            .with_endpoint(format!("ws://{addr}"))
            .with_connect_timeout(Duration::from_millis(100));
        let err = synthesize(config, &request()).await.unwrap_err();

        assert!(matches!(err, ClientError::ConnectTimeout(d) if d == Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn connect_twice_is_rejected() {
        let mut client = TtsClient::new(config().with_endpoint("ws://127.0.0.1:1"));
        let _ = client.connect().await;

        let err = client.connect().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::InvalidState {
                expected: SessionState::Idle,
                ..
            }
        ));
    }
}
