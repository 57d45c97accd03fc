use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::gifts::GiftPayload;

/// Events a client pushes into a room.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "stream:join")]
    JoinStream { stream_id: String },
    #[serde(rename = "stream:leave")]
    LeaveStream { stream_id: String },
    #[serde(rename = "stream:message")]
    StreamMessage { stream_id: String, text: String },
    #[serde(rename = "stream:gift")]
    StreamGift(GiftPayload),
    #[serde(rename = "pk:start")]
    PkStart {
        stream_id: String,
        opponent_id: String,
    },
}

/// A chat line broadcast to everyone in a room, sender included.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StreamMessage {
    pub id: String,
    pub stream_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Events the server pushes to subscribed clients.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "stream:user_joined")]
    UserJoined {
        stream_id: String,
        user_id: String,
        username: String,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "stream:user_left")]
    UserLeft {
        stream_id: String,
        user_id: String,
        username: String,
    },
    #[serde(rename = "newStreamMessage")]
    StreamMessage(StreamMessage),
    #[serde(rename = "newStreamGift")]
    StreamGift(GiftPayload),
    #[serde(rename = "pk:status_update")]
    PkStatus {
        stream_id: String,
        active: bool,
        opponent_id: Option<String>,
    },
}

/// Discriminant used by the event bridge's dispatch table. Adding a
/// `ServerEvent` variant without a kind is a compile error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    UserJoined,
    UserLeft,
    StreamMessage,
    StreamGift,
    PkStatus,
}

impl ServerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ServerEvent::UserJoined { .. } => EventKind::UserJoined,
            ServerEvent::UserLeft { .. } => EventKind::UserLeft,
            ServerEvent::StreamMessage(_) => EventKind::StreamMessage,
            ServerEvent::StreamGift(_) => EventKind::StreamGift,
            ServerEvent::PkStatus { .. } => EventKind::PkStatus,
        }
    }

    /// Room the event belongs to.
    pub fn stream_id(&self) -> &str {
        match self {
            ServerEvent::UserJoined { stream_id, .. }
            | ServerEvent::UserLeft { stream_id, .. }
            | ServerEvent::PkStatus { stream_id, .. } => stream_id,
            ServerEvent::StreamMessage(message) => &message.stream_id,
            ServerEvent::StreamGift(payload) => &payload.room_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_events_keep_their_wire_names() {
        let event = ServerEvent::UserLeft {
            stream_id: "s-1".to_string(),
            user_id: "u-1".to_string(),
            username: "Mirella".to_string(),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "stream:user_left");
        assert_eq!(value["data"]["stream_id"], "s-1");
    }

    #[test]
    fn client_events_round_trip() {
        let raw = r#"{"event":"stream:join","data":{"stream_id":"s-9"}}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        match event {
            ClientEvent::JoinStream { stream_id } => assert_eq!(stream_id, "s-9"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
