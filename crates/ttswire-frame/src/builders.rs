//! Constructors for the client-originated messages of the protocol.

use bytes::Bytes;

use crate::codec::Message;
use crate::types::{EventType, MsgType, MsgTypeFlag};

/// Payload used by lifecycle messages that carry no parameters.
pub const EMPTY_JSON: &[u8] = b"{}";

/// A full client request without sequence or event.
pub fn full_client_request(payload: impl Into<Bytes>) -> Message {
    Message {
        payload: payload.into(),
        ..Message::new(MsgType::FullClientRequest, MsgTypeFlag::NoSeq)
    }
}

/// An audio-only client frame.
pub fn audio_only_client(payload: impl Into<Bytes>, flag: MsgTypeFlag) -> Message {
    Message {
        payload: payload.into(),
        ..Message::new(MsgType::AudioOnlyClient, flag)
    }
}

/// Open a protocol-level connection.
pub fn start_connection() -> Message {
    event_request(EventType::StartConnection, "", Bytes::from_static(EMPTY_JSON))
}

/// Close a protocol-level connection.
pub fn finish_connection() -> Message {
    event_request(EventType::FinishConnection, "", Bytes::from_static(EMPTY_JSON))
}

/// Open a session with the given parameters.
pub fn start_session(payload: impl Into<Bytes>, session_id: &str) -> Message {
    event_request(EventType::StartSession, session_id, payload.into())
}

/// Finish a session gracefully.
pub fn finish_session(session_id: &str) -> Message {
    event_request(
        EventType::FinishSession,
        session_id,
        Bytes::from_static(EMPTY_JSON),
    )
}

/// Cancel a session.
pub fn cancel_session(session_id: &str) -> Message {
    event_request(
        EventType::CancelSession,
        session_id,
        Bytes::from_static(EMPTY_JSON),
    )
}

/// Send a task within an open session.
pub fn task_request(payload: impl Into<Bytes>, session_id: &str) -> Message {
    event_request(EventType::TaskRequest, session_id, payload.into())
}

fn event_request(event: EventType, session_id: &str, payload: Bytes) -> Message {
    Message {
        event,
        session_id: session_id.to_string(),
        payload,
        ..Message::new(MsgType::FullClientRequest, MsgTypeFlag::WithEvent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode};

    #[test]
    fn full_client_request_has_no_optional_fields() {
        let message = full_client_request(b"{\"a\":1}".to_vec());
        assert_eq!(message.msg_type, MsgType::FullClientRequest);
        assert_eq!(message.flag, MsgTypeFlag::NoSeq);
        assert!(!message.has_sequence());
        assert!(!message.has_session_id());
        assert_eq!(encode(&message).unwrap().len(), 4 + 4 + 7);
    }

    #[test]
    fn connection_messages_carry_empty_json() {
        for message in [start_connection(), finish_connection()] {
            assert_eq!(message.flag, MsgTypeFlag::WithEvent);
            assert_eq!(message.payload.as_ref(), EMPTY_JSON);
            assert!(!message.has_session_id());
        }
    }

    #[test]
    fn session_messages_roundtrip() {
        let messages = [
            start_session(b"{\"speaker\":\"x\"}".to_vec(), "sess-1"),
            task_request(b"{\"text\":\"hi\"}".to_vec(), "sess-1"),
            finish_session("sess-1"),
            cancel_session("sess-1"),
        ];
        for message in messages {
            let decoded = decode(&encode(&message).unwrap()).unwrap();
            assert_eq!(decoded.session_id, "sess-1");
            assert_eq!(decoded, message);
        }
    }

    #[test]
    fn audio_only_client_keeps_flag() {
        let mut message = audio_only_client(vec![1u8, 2, 3], MsgTypeFlag::NegativeSeq);
        message.sequence = -2;
        let decoded = decode(&encode(&message).unwrap()).unwrap();
        assert_eq!(decoded.sequence, -2);
        assert_eq!(decoded.payload.as_ref(), &[1, 2, 3]);
    }
}
