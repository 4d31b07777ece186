//! ChatMessageRepository - Messages of anonymous sessions

use super::Create;
use crate::dtos::CreateChatMessageDTO;
use crate::entities::ChatMessage;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Error, SqlitePool};
use tracing::instrument;

pub struct ChatMessageRepository {
    connection_pool: SqlitePool,
}

impl ChatMessageRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Page of messages older than `before`, returned in chronological order
    #[instrument(skip(self))]
    pub async fn find_page(
        &self,
        session_id: &i64,
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, Error> {
        let mut messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT message_id, session_id, sender_id, payload, created_at
            FROM chat_messages
            WHERE session_id = ? AND (? IS NULL OR created_at < ?)
            ORDER BY created_at DESC, message_id DESC
            LIMIT ?
            "#,
        )
        .bind(session_id)
        .bind(before)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await?;

        messages.reverse();
        Ok(messages)
    }
}

impl Create<ChatMessage, CreateChatMessageDTO> for ChatMessageRepository {
    #[instrument(skip(self, data), fields(session_id = %data.session_id))]
    async fn create(&self, data: &CreateChatMessageDTO) -> Result<ChatMessage, Error> {
        sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (session_id, sender_id, payload, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING message_id, session_id, sender_id, payload, created_at
            "#,
        )
        .bind(data.session_id)
        .bind(data.sender_id)
        .bind(Json(&data.payload))
        .bind(data.created_at)
        .fetch_one(&self.connection_pool)
        .await
    }
}
