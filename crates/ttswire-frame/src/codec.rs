use std::fmt;
use std::ops::Range;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::types::{
    Compression, EventType, HeaderSize, MsgType, MsgTypeFlag, Serialization, Version,
};

/// Bytes of the fixed header that precede any padding.
pub const FIXED_HEADER_LEN: usize = 3;

/// Maximum number of payload bytes echoed by the `Display` impl.
const DISPLAY_PAYLOAD_LIMIT: usize = 100;

/// One binary protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub version: Version,
    pub header_size: HeaderSize,
    pub msg_type: MsgType,
    pub flag: MsgTypeFlag,
    pub serialization: Serialization,
    pub compression: Compression,
    /// Only meaningful when `flag` is [`MsgTypeFlag::WithEvent`].
    pub event: EventType,
    pub session_id: String,
    /// Populated by the server on connection responses; never encoded.
    pub connect_id: String,
    pub sequence: i32,
    pub error_code: u32,
    pub payload: Bytes,
}

impl Message {
    /// Create a message of the given type and flag with protocol defaults.
    pub fn new(msg_type: MsgType, flag: MsgTypeFlag) -> Self {
        Self {
            msg_type,
            flag,
            ..Self::default()
        }
    }

    /// Whether the sequence field is present on the wire.
    ///
    /// Requires both a stream-carrying type and a sequence flag.
    pub fn has_sequence(&self) -> bool {
        self.msg_type.carries_sequence() && self.flag.has_sequence()
    }

    /// Whether the session id is present on the wire.
    pub fn has_session_id(&self) -> bool {
        self.flag == MsgTypeFlag::WithEvent && !self.event.is_connection_lifecycle()
    }

    /// Whether the error code is present on the wire.
    pub fn has_error_code(&self) -> bool {
        !self.has_sequence() && self.msg_type == MsgType::Error
    }

    /// An audio frame with a negative sequence ends the stream.
    pub fn is_terminal_audio(&self) -> bool {
        self.msg_type == MsgType::AudioOnlyServer && self.sequence < 0
    }

    /// Size of this message on the wire in bytes.
    ///
    /// Connection responses count their connect id, which the server writes
    /// but [`encode`] never does.
    pub fn wire_size(&self) -> usize {
        let mut size = self.header_size.byte_len();
        if self.flag == MsgTypeFlag::WithEvent {
            size += 4;
            if self.has_session_id() {
                size += 4 + self.session_id.len();
            }
            if self.event.carries_connect_id() {
                size += 4 + self.connect_id.len();
            }
        }
        if self.has_sequence() || self.has_error_code() {
            size += 4;
        }
        size + 4 + self.payload.len()
    }

    /// Payload decoded as UTF-8 (lossy), truncated to `limit` bytes.
    pub fn payload_text(&self, limit: usize) -> String {
        let end = self.payload.len().min(limit);
        String::from_utf8_lossy(&self.payload[..end]).into_owned()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MsgType: {}, EventType: {}",
            self.msg_type.name(),
            self.event.name()
        )?;
        match self.msg_type {
            MsgType::AudioOnlyServer | MsgType::AudioOnlyClient => {
                if self.has_sequence() {
                    write!(f, ", Sequence: {}", self.sequence)?;
                }
                write!(f, ", PayloadSize: {}", self.payload.len())
            }
            MsgType::Error => write!(
                f,
                ", ErrorCode: {}, Payload: {}",
                self.error_code,
                self.payload_text(DISPLAY_PAYLOAD_LIMIT)
            ),
            _ => {
                if self.has_sequence() {
                    write!(f, ", Sequence: {}", self.sequence)?;
                }
                write!(f, ", Payload: {}", self.payload_text(DISPLAY_PAYLOAD_LIMIT))
            }
        }
    }
}

/// Encode a message into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬──────────┬────────────┬──────────┬────────────┐
/// │ ver|hsz │ typ|flg │ ser|cmp │ padding │ event    │ session id │ seq/err  │ payload    │
/// │ (1B)    │ (1B)    │ (1B)    │ to 4*hsz│ (i32 BE) │ (u32 BE+N) │ (4B BE)  │ (u32 BE+N) │
/// └─────────┴─────────┴─────────┴─────────┴──────────┴────────────┴──────────┴────────────┘
/// ```
/// Event and session id are conditional on the flag, the sequence or error
/// code on the type. The payload length prefix is always present.
pub fn encode_message(message: &Message, dst: &mut BytesMut) -> Result<()> {
    if message.has_session_id() {
        check_u32_len("session id", message.session_id.len())?;
    }
    check_u32_len("payload", message.payload.len())?;

    dst.reserve(message.wire_size());
    let start = dst.len();

    dst.put_u8((message.version.bits() << 4) | message.header_size.bits());
    dst.put_u8((message.msg_type.bits() << 4) | message.flag.bits());
    dst.put_u8((message.serialization.bits() << 4) | message.compression.bits());
    let header_end = start + message.header_size.byte_len();
    while dst.len() < header_end {
        dst.put_u8(0);
    }

    if message.flag == MsgTypeFlag::WithEvent {
        dst.put_i32(message.event.value());
        if message.has_session_id() {
            dst.put_u32(message.session_id.len() as u32);
            dst.put_slice(message.session_id.as_bytes());
        }
    }

    if message.has_sequence() {
        dst.put_i32(message.sequence);
    } else if message.msg_type == MsgType::Error {
        dst.put_u32(message.error_code);
    }

    dst.put_u32(message.payload.len() as u32);
    dst.put_slice(&message.payload);
    Ok(())
}

/// Encode a message into a freshly allocated buffer.
pub fn encode(message: &Message) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(message.wire_size());
    encode_message(message, &mut dst)?;
    Ok(dst.freeze())
}

/// Decode one complete message.
///
/// The transport delivers whole messages, so any shortfall is an error rather
/// than a request for more data. Trailing bytes after the payload are ignored.
pub fn decode(src: &[u8]) -> Result<Message> {
    let (mut message, payload) = decode_fields(src)?;
    message.payload = Bytes::copy_from_slice(&src[payload]);
    Ok(message)
}

/// Like [`decode`], but the payload shares `src` instead of being copied.
pub fn decode_bytes(src: Bytes) -> Result<Message> {
    let (mut message, payload) = decode_fields(&src)?;
    message.payload = src.slice(payload);
    Ok(message)
}

/// Decode everything but the payload, returning the payload's byte range.
fn decode_fields(src: &[u8]) -> Result<(Message, Range<usize>)> {
    if src.len() < FIXED_HEADER_LEN {
        return Err(FrameError::TooShort {
            field: "fixed header",
            needed: FIXED_HEADER_LEN,
            available: src.len(),
        });
    }

    let header_size = HeaderSize::from_bits(src[0] & 0x0F)?;
    let mut message = Message {
        version: Version::from_bits(src[0] >> 4)?,
        header_size,
        msg_type: MsgType::from_bits(src[1] >> 4)?,
        flag: MsgTypeFlag::from_bits(src[1] & 0x0F)?,
        serialization: Serialization::from_bits(src[2] >> 4)?,
        compression: Compression::from_bits(src[2] & 0x0F)?,
        ..Message::default()
    };

    let mut buf = src;
    skip(&mut buf, header_size.byte_len(), "header")?;

    if message.flag == MsgTypeFlag::WithEvent {
        message.event = EventType::from_value(read_i32(&mut buf, "event")?);
        if message.has_session_id() {
            message.session_id = read_string(&mut buf, "session id")?;
        }
        if message.event.carries_connect_id() {
            message.connect_id = read_string(&mut buf, "connect id")?;
        }
    }

    if message.has_sequence() {
        message.sequence = read_i32(&mut buf, "sequence")?;
    } else if message.msg_type == MsgType::Error {
        message.error_code = read_u32(&mut buf, "error code")?;
    }

    let len = read_u32(&mut buf, "payload length")? as usize;
    ensure(buf, len, "payload")?;
    let start = src.len() - buf.len();

    Ok((message, start..start + len))
}

fn check_u32_len(field: &'static str, size: usize) -> Result<()> {
    if size > u32::MAX as usize {
        return Err(FrameError::FieldTooLarge { field, size });
    }
    Ok(())
}

fn ensure(buf: &[u8], needed: usize, field: &'static str) -> Result<()> {
    if buf.remaining() < needed {
        return Err(FrameError::TooShort {
            field,
            needed,
            available: buf.remaining(),
        });
    }
    Ok(())
}

fn skip(buf: &mut &[u8], len: usize, field: &'static str) -> Result<()> {
    ensure(buf, len, field)?;
    buf.advance(len);
    Ok(())
}

fn read_i32(buf: &mut &[u8], field: &'static str) -> Result<i32> {
    ensure(buf, 4, field)?;
    Ok(buf.get_i32())
}

fn read_u32(buf: &mut &[u8], field: &'static str) -> Result<u32> {
    ensure(buf, 4, field)?;
    Ok(buf.get_u32())
}

fn read_string(buf: &mut &[u8], field: &'static str) -> Result<String> {
    let len = read_u32(buf, field)? as usize;
    ensure(buf, len, field)?;
    let value = std::str::from_utf8(&buf[..len])
        .map_err(|_| FrameError::InvalidUtf8 { field })?
        .to_owned();
    buf.advance(len);
    Ok(value)
}
