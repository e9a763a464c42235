/// Errors that can occur during message encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The buffer ended before a field could be read in full.
    #[error("truncated frame: {field} needs {needed} bytes, {available} available")]
    TooShort {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// The version nibble is outside 1..=4.
    #[error("invalid protocol version {0}")]
    InvalidVersion(u8),

    /// The header size nibble is outside 1..=4.
    #[error("invalid header size class {0}")]
    InvalidHeaderSize(u8),

    /// The message type nibble does not name a known type.
    #[error("unknown message type 0b{0:04b}")]
    UnknownMessageType(u8),

    /// The flag nibble does not name a known flag.
    #[error("unknown message flag 0b{0:04b}")]
    UnknownFlag(u8),

    /// The serialization nibble does not name a known method.
    #[error("unknown serialization method 0b{0:04b}")]
    UnknownSerialization(u8),

    /// The compression nibble does not name a known method.
    #[error("unknown compression method 0b{0:04b}")]
    UnknownCompression(u8),

    /// A length-prefixed field does not fit in a u32 length.
    #[error("{field} too large ({size} bytes, max {max})", max = u32::MAX)]
    FieldTooLarge { field: &'static str, size: usize },

    /// A string field is not valid UTF-8.
    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },
}

pub type Result<T> = std::result::Result<T, FrameError>;
