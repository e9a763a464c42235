//! Bit-packed binary message codec for the VolcEngine TTS WebSocket protocol.
//!
//! Every message starts with a 3-byte fixed header packed as nibbles:
//! - version / header size class
//! - message type / flag
//! - serialization / compression
//!
//! followed by zero padding up to `4 * header size class` bytes, the optional
//! event, session id, sequence or error code fields, and a length-prefixed
//! payload. All integers are big-endian. This crate performs no I/O.

pub mod builders;
pub mod codec;
pub mod error;
pub mod types;

pub use builders::{
    audio_only_client, cancel_session, finish_connection, finish_session, full_client_request,
    start_connection, start_session, task_request,
};
pub use codec::{decode, decode_bytes, encode, encode_message, Message, FIXED_HEADER_LEN};
pub use error::{FrameError, Result};
pub use types::{
    Compression, EventType, HeaderSize, MsgType, MsgTypeFlag, Serialization, Version,
};
