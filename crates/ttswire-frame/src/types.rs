//! Header enumerations and their wire values.
//!
//! Every nibble in the 3-byte fixed header maps to one of the enums below.
//! The mapping tables are explicit so that each wire value is reviewed in one
//! place; `from_bits` rejects values the protocol does not define.

use crate::error::{FrameError, Result};

/// Protocol version marker (high nibble of byte 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Version {
    #[default]
    V1,
    V2,
    V3,
    V4,
}

impl Version {
    pub fn bits(self) -> u8 {
        match self {
            Version::V1 => 1,
            Version::V2 => 2,
            Version::V3 => 3,
            Version::V4 => 4,
        }
    }

    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            1 => Ok(Version::V1),
            2 => Ok(Version::V2),
            3 => Ok(Version::V3),
            4 => Ok(Version::V4),
            other => Err(FrameError::InvalidVersion(other)),
        }
    }
}

/// Header length in 4-byte words (low nibble of byte 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeaderSize {
    #[default]
    Size4,
    Size8,
    Size12,
    Size16,
}

impl HeaderSize {
    pub fn bits(self) -> u8 {
        match self {
            HeaderSize::Size4 => 1,
            HeaderSize::Size8 => 2,
            HeaderSize::Size12 => 3,
            HeaderSize::Size16 => 4,
        }
    }

    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            1 => Ok(HeaderSize::Size4),
            2 => Ok(HeaderSize::Size8),
            3 => Ok(HeaderSize::Size12),
            4 => Ok(HeaderSize::Size16),
            other => Err(FrameError::InvalidHeaderSize(other)),
        }
    }

    /// Header length in bytes, padding included.
    pub fn byte_len(self) -> usize {
        4 * self.bits() as usize
    }
}

/// Message type (high nibble of byte 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MsgType {
    #[default]
    Invalid,
    FullClientRequest,
    AudioOnlyClient,
    FullServerResponse,
    AudioOnlyServer,
    FrontEndResultServer,
    Error,
}

impl MsgType {
    pub fn bits(self) -> u8 {
        match self {
            MsgType::Invalid => 0b0000,
            MsgType::FullClientRequest => 0b0001,
            MsgType::AudioOnlyClient => 0b0010,
            MsgType::FullServerResponse => 0b1001,
            MsgType::AudioOnlyServer => 0b1011,
            MsgType::FrontEndResultServer => 0b1100,
            MsgType::Error => 0b1111,
        }
    }

    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0b0000 => Ok(MsgType::Invalid),
            0b0001 => Ok(MsgType::FullClientRequest),
            0b0010 => Ok(MsgType::AudioOnlyClient),
            0b1001 => Ok(MsgType::FullServerResponse),
            0b1011 => Ok(MsgType::AudioOnlyServer),
            0b1100 => Ok(MsgType::FrontEndResultServer),
            0b1111 => Ok(MsgType::Error),
            other => Err(FrameError::UnknownMessageType(other)),
        }
    }

    /// Types whose payload is part of an ordered stream.
    pub fn carries_sequence(self) -> bool {
        matches!(
            self,
            MsgType::FullClientRequest
                | MsgType::FullServerResponse
                | MsgType::FrontEndResultServer
                | MsgType::AudioOnlyClient
                | MsgType::AudioOnlyServer
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            MsgType::Invalid => "Invalid",
            MsgType::FullClientRequest => "FullClientRequest",
            MsgType::AudioOnlyClient => "AudioOnlyClient",
            MsgType::FullServerResponse => "FullServerResponse",
            MsgType::AudioOnlyServer => "AudioOnlyServer",
            MsgType::FrontEndResultServer => "FrontEndResultServer",
            MsgType::Error => "Error",
        }
    }
}

/// Message type-specific flag (low nibble of byte 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MsgTypeFlag {
    /// Non-terminal packet without sequence.
    #[default]
    NoSeq,
    /// Non-terminal packet with sequence > 0.
    PositiveSeq,
    /// Last packet without sequence.
    LastNoSeq,
    /// Last packet with sequence < 0.
    NegativeSeq,
    /// Packet carries an event number.
    WithEvent,
}

impl MsgTypeFlag {
    pub fn bits(self) -> u8 {
        match self {
            MsgTypeFlag::NoSeq => 0b000,
            MsgTypeFlag::PositiveSeq => 0b001,
            MsgTypeFlag::LastNoSeq => 0b010,
            MsgTypeFlag::NegativeSeq => 0b011,
            MsgTypeFlag::WithEvent => 0b100,
        }
    }

    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0b000 => Ok(MsgTypeFlag::NoSeq),
            0b001 => Ok(MsgTypeFlag::PositiveSeq),
            0b010 => Ok(MsgTypeFlag::LastNoSeq),
            0b011 => Ok(MsgTypeFlag::NegativeSeq),
            0b100 => Ok(MsgTypeFlag::WithEvent),
            other => Err(FrameError::UnknownFlag(other)),
        }
    }

    pub fn has_sequence(self) -> bool {
        matches!(self, MsgTypeFlag::PositiveSeq | MsgTypeFlag::NegativeSeq)
    }
}

/// Payload serialization method (high nibble of byte 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Serialization {
    Raw,
    #[default]
    Json,
    Thrift,
    Custom,
}

impl Serialization {
    pub fn bits(self) -> u8 {
        match self {
            Serialization::Raw => 0b0000,
            Serialization::Json => 0b0001,
            Serialization::Thrift => 0b0011,
            Serialization::Custom => 0b1111,
        }
    }

    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0b0000 => Ok(Serialization::Raw),
            0b0001 => Ok(Serialization::Json),
            0b0011 => Ok(Serialization::Thrift),
            0b1111 => Ok(Serialization::Custom),
            other => Err(FrameError::UnknownSerialization(other)),
        }
    }
}

/// Payload compression method (low nibble of byte 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Custom,
}

impl Compression {
    pub fn bits(self) -> u8 {
        match self {
            Compression::None => 0b0000,
            Compression::Gzip => 0b0001,
            Compression::Custom => 0b1111,
        }
    }

    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0b0000 => Ok(Compression::None),
            0b0001 => Ok(Compression::Gzip),
            0b1111 => Ok(Compression::Custom),
            other => Err(FrameError::UnknownCompression(other)),
        }
    }
}

/// Event number carried when the flag is [`MsgTypeFlag::WithEvent`].
///
/// Ranges:
/// - 1-49 upstream / 50-99 downstream connection events
/// - 100-149 upstream / 150-199 downstream session events
/// - 200-299 general events
/// - 300-399 TTS events, 450-499 ASR events
/// - 500-599 dialogue events, 650-699 subtitle events
///
/// Values the table does not name decode to [`EventType::Unknown`] so the
/// number survives a decode/encode cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventType {
    #[default]
    None,

    StartConnection,
    StartTask,
    FinishConnection,
    FinishTask,

    ConnectionStarted,
    TaskStarted,
    ConnectionFailed,
    TaskFailed,
    ConnectionFinished,
    TaskFinished,

    StartSession,
    CancelSession,
    FinishSession,

    SessionStarted,
    SessionCanceled,
    SessionFinished,
    SessionFailed,
    UsageResponse,
    ChargeData,

    TaskRequest,
    UpdateConfig,

    AudioMuted,

    SayHello,

    TtsSentenceStart,
    TtsSentenceEnd,
    TtsResponse,
    TtsEnded,
    PodcastRoundStart,
    PodcastRoundResponse,
    PodcastRoundEnd,

    AsrInfo,
    AsrResponse,
    AsrEnded,

    ChatTtsText,

    ChatResponse,
    ChatEnded,

    SourceSubtitleStart,
    SourceSubtitleResponse,
    SourceSubtitleEnd,
    TranslationSubtitleStart,
    TranslationSubtitleResponse,
    TranslationSubtitleEnd,

    Unknown(i32),
}

impl EventType {
    pub fn value(self) -> i32 {
        match self {
            EventType::None => 0,
            EventType::StartConnection => 1,
            EventType::StartTask => 2,
            EventType::FinishConnection => 3,
            EventType::FinishTask => 4,
            EventType::ConnectionStarted => 50,
            EventType::TaskStarted => 51,
            EventType::ConnectionFailed => 52,
            EventType::TaskFailed => 53,
            EventType::ConnectionFinished => 54,
            EventType::TaskFinished => 55,
            EventType::StartSession => 100,
            EventType::CancelSession => 101,
            EventType::FinishSession => 102,
            EventType::SessionStarted => 150,
            EventType::SessionCanceled => 151,
            EventType::SessionFinished => 152,
            EventType::SessionFailed => 153,
            EventType::UsageResponse => 154,
            EventType::ChargeData => 155,
            EventType::TaskRequest => 200,
            EventType::UpdateConfig => 201,
            EventType::AudioMuted => 250,
            EventType::SayHello => 300,
            EventType::TtsSentenceStart => 350,
            EventType::TtsSentenceEnd => 351,
            EventType::TtsResponse => 352,
            EventType::TtsEnded => 359,
            EventType::PodcastRoundStart => 360,
            EventType::PodcastRoundResponse => 361,
            EventType::PodcastRoundEnd => 362,
            EventType::AsrInfo => 450,
            EventType::AsrResponse => 451,
            EventType::AsrEnded => 459,
            EventType::ChatTtsText => 500,
            EventType::ChatResponse => 550,
            EventType::ChatEnded => 559,
            EventType::SourceSubtitleStart => 650,
            EventType::SourceSubtitleResponse => 651,
            EventType::SourceSubtitleEnd => 652,
            EventType::TranslationSubtitleStart => 653,
            EventType::TranslationSubtitleResponse => 654,
            EventType::TranslationSubtitleEnd => 655,
            EventType::Unknown(value) => value,
        }
    }

    pub fn from_value(value: i32) -> Self {
        match value {
            0 => EventType::None,
            1 => EventType::StartConnection,
            2 => EventType::StartTask,
            3 => EventType::FinishConnection,
            4 => EventType::FinishTask,
            50 => EventType::ConnectionStarted,
            51 => EventType::TaskStarted,
            52 => EventType::ConnectionFailed,
            53 => EventType::TaskFailed,
            54 => EventType::ConnectionFinished,
            55 => EventType::TaskFinished,
            100 => EventType::StartSession,
            101 => EventType::CancelSession,
            102 => EventType::FinishSession,
            150 => EventType::SessionStarted,
            151 => EventType::SessionCanceled,
            152 => EventType::SessionFinished,
            153 => EventType::SessionFailed,
            154 => EventType::UsageResponse,
            155 => EventType::ChargeData,
            200 => EventType::TaskRequest,
            201 => EventType::UpdateConfig,
            250 => EventType::AudioMuted,
            300 => EventType::SayHello,
            350 => EventType::TtsSentenceStart,
            351 => EventType::TtsSentenceEnd,
            352 => EventType::TtsResponse,
            359 => EventType::TtsEnded,
            360 => EventType::PodcastRoundStart,
            361 => EventType::PodcastRoundResponse,
            362 => EventType::PodcastRoundEnd,
            450 => EventType::AsrInfo,
            451 => EventType::AsrResponse,
            459 => EventType::AsrEnded,
            500 => EventType::ChatTtsText,
            550 => EventType::ChatResponse,
            559 => EventType::ChatEnded,
            650 => EventType::SourceSubtitleStart,
            651 => EventType::SourceSubtitleResponse,
            652 => EventType::SourceSubtitleEnd,
            653 => EventType::TranslationSubtitleStart,
            654 => EventType::TranslationSubtitleResponse,
            655 => EventType::TranslationSubtitleEnd,
            other => EventType::Unknown(other),
        }
    }

    /// Pure connection-lifecycle events. These never carry a session id.
    pub fn is_connection_lifecycle(self) -> bool {
        matches!(
            self,
            EventType::StartConnection
                | EventType::FinishConnection
                | EventType::ConnectionStarted
                | EventType::ConnectionFailed
                | EventType::ConnectionFinished
        )
    }

    /// Server responses to connection lifecycle requests. These carry a
    /// connect id on the wire.
    pub fn carries_connect_id(self) -> bool {
        matches!(
            self,
            EventType::ConnectionStarted
                | EventType::ConnectionFailed
                | EventType::ConnectionFinished
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            EventType::None => "None",
            EventType::StartConnection => "StartConnection",
            EventType::StartTask => "StartTask",
            EventType::FinishConnection => "FinishConnection",
            EventType::FinishTask => "FinishTask",
            EventType::ConnectionStarted => "ConnectionStarted",
            EventType::TaskStarted => "TaskStarted",
            EventType::ConnectionFailed => "ConnectionFailed",
            EventType::TaskFailed => "TaskFailed",
            EventType::ConnectionFinished => "ConnectionFinished",
            EventType::TaskFinished => "TaskFinished",
            EventType::StartSession => "StartSession",
            EventType::CancelSession => "CancelSession",
            EventType::FinishSession => "FinishSession",
            EventType::SessionStarted => "SessionStarted",
            EventType::SessionCanceled => "SessionCanceled",
            EventType::SessionFinished => "SessionFinished",
            EventType::SessionFailed => "SessionFailed",
            EventType::UsageResponse => "UsageResponse",
            EventType::ChargeData => "ChargeData",
            EventType::TaskRequest => "TaskRequest",
            EventType::UpdateConfig => "UpdateConfig",
            EventType::AudioMuted => "AudioMuted",
            EventType::SayHello => "SayHello",
            EventType::TtsSentenceStart => "TTSSentenceStart",
            EventType::TtsSentenceEnd => "TTSSentenceEnd",
            EventType::TtsResponse => "TTSResponse",
            EventType::TtsEnded => "TTSEnded",
            EventType::PodcastRoundStart => "PodcastRoundStart",
            EventType::PodcastRoundResponse => "PodcastRoundResponse",
            EventType::PodcastRoundEnd => "PodcastRoundEnd",
            EventType::AsrInfo => "ASRInfo",
            EventType::AsrResponse => "ASRResponse",
            EventType::AsrEnded => "ASREnded",
            EventType::ChatTtsText => "ChatTTSText",
            EventType::ChatResponse => "ChatResponse",
            EventType::ChatEnded => "ChatEnded",
            EventType::SourceSubtitleStart => "SourceSubtitleStart",
            EventType::SourceSubtitleResponse => "SourceSubtitleResponse",
            EventType::SourceSubtitleEnd => "SourceSubtitleEnd",
            EventType::TranslationSubtitleStart => "TranslationSubtitleStart",
            EventType::TranslationSubtitleResponse => "TranslationSubtitleResponse",
            EventType::TranslationSubtitleEnd => "TranslationSubtitleEnd",
            EventType::Unknown(_) => "Unknown",
        }
    }
}
