//! Message-framed duplex transport abstraction.
//!
//! Provides a unified interface over the transports a TTS session can run on:
//! - WebSocket (`ws://` / `wss://`) with per-connection request headers
//! - An in-memory pair for driving sessions in tests
//!
//! This is the lowest layer of ttswire. Every transport delivers whole binary
//! messages; framing inside a message is the job of `ttswire-frame`.

pub mod error;
pub mod memory;
pub mod traits;
pub mod websocket;

pub use error::{Result, TransportError};
pub use memory::{CloseProbe, MemoryTransport};
pub use traits::Duplex;
pub use websocket::{WsTransport, AUTHORIZATION};
