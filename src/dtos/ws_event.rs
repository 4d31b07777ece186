//! WebSocket Event DTOs
//!
//! Serialized as `{ "type": "messages", "data": [ ... ] }`.

use crate::dtos::{ChatMessageDTO, ChatSessionDTO, NotificationDTO};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WsEventDTO {
    /// Batch of chat messages
    Messages(Vec<Arc<ChatMessageDTO>>),
    SessionMatched(ChatSessionDTO),
    SessionEnded { session_id: i64 },
    Notification(NotificationDTO),
    Error { code: u16, message: String },
}
