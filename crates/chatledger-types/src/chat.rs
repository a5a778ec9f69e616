//! Chat session and message types for Chatledger.
//!
//! These types model a persisted conversation: one session per external
//! chat identifier, many timestamped messages per session, and the bounded
//! history window handed back to the model client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Role of a message turn in a conversation.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'model'))`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Model => write!(f, "model"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "model" => Ok(MessageRole::Model),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A persisted conversation thread tied one-to-one to an external chat.
///
/// Sessions are created lazily on first contact and never deleted in
/// normal operation; clearing history removes their messages only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    /// Opaque identifier supplied by the messaging platform, unique per
    /// real-world conversation.
    pub external_chat_id: String,
}

/// A single message within a chat session.
///
/// Messages are ordered by `timestamp` within a session. The timestamp is
/// caller-supplied and reflects when the originating event occurred, not
/// when the row was inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Caller-supplied deduplication token. A retried append carrying the
    /// same key returns the original message instead of inserting twice.
    pub idempotency_key: Option<String>,
}

/// One entry of the history window, in the shape a model client resumes a
/// conversation with.
///
/// Serializes to `{"role": "user"|"model", "content": "..."}`. This is the
/// wire contract between persistence and inference; role and content
/// round-trip verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: MessageRole,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::User, MessageRole::Model] {
            let s = role.to_string();
            let parsed: MessageRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_message_role_serde() {
        let role = MessageRole::Model;
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, "\"model\"");
        let parsed: MessageRole = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MessageRole::Model);
    }

    #[test]
    fn test_message_role_rejects_unknown() {
        let err = "assistant".parse::<MessageRole>().unwrap_err();
        assert!(err.contains("assistant"));
    }

    #[test]
    fn test_history_entry_wire_shape() {
        let entry = HistoryEntry {
            role: MessageRole::User,
            content: "What's the weather in Lisbon?".to_string(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            "{\"role\":\"user\",\"content\":\"What's the weather in Lisbon?\"}"
        );
        let parsed: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_chat_message_serialize() {
        let message = ChatMessage {
            id: Uuid::now_v7(),
            session_id: Uuid::now_v7(),
            role: MessageRole::User,
            content: "hello".to_string(),
            timestamp: Utc::now(),
            idempotency_key: None,
        };
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"role\":\"user\""));
    }
}
