use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender_id: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Stored thread between two users.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Conversation {
    pub id: String,
    pub participants: Vec<String>,
    pub messages: Vec<ChatMessage>,
    pub unread_count: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FriendSummary {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
    pub is_online: bool,
    pub level: i64,
}

/// A conversation as seen by one participant.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConversationView {
    pub id: String,
    pub friend: FriendSummary,
    pub last_message: String,
    pub unread_count: u32,
    pub updated_at: DateTime<Utc>,
}
