//! Client for the VolcEngine binary WebSocket text-to-speech protocol.
//!
//! ttswire speaks the bit-packed binary framing used by VolcEngine-compatible
//! TTS services: it authenticates a WebSocket, sends one synthesis request,
//! and collects the streamed audio until the terminal frame.
//!
//! # Crate Structure
//!
//! - [`transport`]: Duplex transport abstraction (WebSocket, in-memory)
//! - [`frame`]: Binary message codec, no I/O
//! - [`client`]: Session client and one-shot `synthesize` (behind `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use ttswire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use ttswire_frame::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use ttswire_client::*;
}
