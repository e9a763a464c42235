//! Single-flight TTS client over the binary WebSocket protocol.
//!
//! This is the "just works" layer. Build an [`AuthConfig`] and a
//! [`ClientConfig`], then call [`synthesize`] with a [`SynthesisRequest`] to
//! get the complete audio back. [`TtsClient`] exposes the session state
//! machine for callers that want to observe it or supply their own transport.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod session;

pub use auth::{authorization_header, authorization_header_at, clean_token, AuthConfig, AuthScheme};
pub use client::{synthesize, synthesize_detailed, MessageObserver, SynthesisOutcome, TtsClient};
pub use config::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
pub use error::{ClientError, Result};
pub use request::{
    cluster_for_voice, AudioEncoding, RequestPayload, SynthesisRequest, CLUSTER_ICL, CLUSTER_TTS,
};
pub use session::{handle_frame, AudioAccumulator, FrameAction, SessionState};
