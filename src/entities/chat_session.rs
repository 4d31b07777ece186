//! ChatSession entity - Anonymous 1:1 chat session and its participants

use super::enums::SessionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct ChatSession {
    pub session_id: i64,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct ChatParticipant {
    pub session_id: i64,
    pub user_id: i64,
    /// name shown to the other participant instead of the real account
    pub alias: String,
    pub joined_at: DateTime<Utc>,
}
