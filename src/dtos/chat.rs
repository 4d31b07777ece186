//! Chat DTOs - Anonymous chat sessions and messages

use crate::entities::{ChatSession, MessagePayload, SessionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session as seen by one participant
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatSessionDTO {
    pub session_id: i64,
    pub status: SessionStatus,
    pub my_alias: String,
    pub partner_alias: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatSessionDTO {
    pub fn new(session: &ChatSession, my_alias: String, partner_alias: Option<String>) -> Self {
        Self {
            session_id: session.session_id,
            status: session.status,
            my_alias,
            partner_alias,
            created_at: session.created_at,
        }
    }
}

/// Outcome of `POST /chat/match`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "outcome", content = "session", rename_all = "snake_case")]
pub enum MatchResultDTO {
    /// A new pending session was created, wait for a partner
    Waiting(ChatSessionDTO),
    /// Joined someone else's pending session
    Matched(ChatSessionDTO),
    /// Caller was already in an open session
    Existing(ChatSessionDTO),
}

/// Message as delivered to participants, the sender is only identified by alias
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessageDTO {
    pub message_id: i64,
    pub session_id: i64,
    pub sender_alias: String,
    pub payload: MessagePayload,
    pub created_at: DateTime<Utc>,
}

/// Message sent by a client, over HTTP or WebSocket
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SendMessageDTO {
    pub session_id: i64,
    pub payload: MessagePayload,
}

/// Body of `POST /chat/sessions/{id}/messages`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageBodyDTO {
    pub payload: MessagePayload,
}

/// Insert payload for the chat_messages table
#[derive(Debug, Clone)]
pub struct CreateChatMessageDTO {
    pub session_id: i64,
    pub sender_id: i64,
    pub payload: MessagePayload,
    pub created_at: DateTime<Utc>,
}
