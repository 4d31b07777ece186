//! ChatSessionRepository - Anonymous 1:1 sessions and their participants

use super::Read;
use crate::entities::{ChatParticipant, ChatSession, SessionStatus};
use chrono::Utc;
use sqlx::{Error, Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, instrument};

/// How many waiting sessions a single claim attempt looks at before giving up
const CLAIM_CANDIDATES: i64 = 8;

/// Outcome of [`ChatSessionRepository::pair_or_wait`]
#[derive(Debug)]
pub enum Pairing {
    Joined(ChatSession, ChatParticipant),
    Waiting(ChatSession, ChatParticipant),
}

async fn insert_participant(
    tx: &mut Transaction<'_, Sqlite>,
    session_id: i64,
    user_id: &i64,
    alias: &str,
) -> Result<ChatParticipant, Error> {
    sqlx::query_as::<_, ChatParticipant>(
        r#"
        INSERT INTO chat_participants (session_id, user_id, alias, joined_at)
        VALUES (?, ?, ?, ?)
        RETURNING session_id, user_id, alias, joined_at
        "#,
    )
    .bind(session_id)
    .bind(user_id)
    .bind(alias)
    .bind(Utc::now())
    .fetch_one(&mut **tx)
    .await
}

pub struct ChatSessionRepository {
    connection_pool: SqlitePool,
}

impl ChatSessionRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// The pending or active session the user is part of, if any
    #[instrument(skip(self))]
    pub async fn find_open_for_user(&self, user_id: &i64) -> Result<Option<ChatSession>, Error> {
        sqlx::query_as::<_, ChatSession>(
            r#"
            SELECT s.session_id, s.status, s.created_at, s.updated_at
            FROM chat_sessions s
            JOIN chat_participants p ON p.session_id = s.session_id
            WHERE p.user_id = ? AND s.status IN ('pending', 'active')
            ORDER BY s.created_at DESC, s.session_id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Ids of the active sessions of a user, used to subscribe a websocket on connect
    pub async fn find_active_ids_for_user(&self, user_id: &i64) -> Result<Vec<i64>, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT s.session_id
            FROM chat_sessions s
            JOIN chat_participants p ON p.session_id = s.session_id
            WHERE p.user_id = ? AND s.status = 'active'
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn participants(&self, session_id: &i64) -> Result<Vec<ChatParticipant>, Error> {
        sqlx::query_as::<_, ChatParticipant>(
            r#"
            SELECT session_id, user_id, alias, joined_at
            FROM chat_participants
            WHERE session_id = ?
            ORDER BY joined_at ASC, user_id ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Joins the oldest session someone else is waiting in, or opens a new pending one.
    ///
    /// Runs under `BEGIN IMMEDIATE`: the write lock is taken before the candidates are read,
    /// so concurrent callers queue on `busy_timeout` instead of failing a lock upgrade, and
    /// a caller never opens a new session while an older one is still claimable. The
    /// `pending -> active` update stays a compare-and-set on the status column.
    #[instrument(skip(self))]
    pub async fn pair_or_wait(
        &self,
        user_id: &i64,
        joining_alias: &str,
        waiting_alias: &str,
    ) -> Result<Pairing, Error> {
        let mut tx = self.connection_pool.begin_with("BEGIN IMMEDIATE").await?;
        let now = Utc::now();

        let candidates = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT s.session_id
            FROM chat_sessions s
            WHERE s.status = 'pending'
              AND NOT EXISTS (
                  SELECT 1 FROM chat_participants p
                  WHERE p.session_id = s.session_id AND p.user_id = ?
              )
            ORDER BY s.created_at ASC, s.session_id ASC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(CLAIM_CANDIDATES)
        .fetch_all(&mut *tx)
        .await?;

        for session_id in candidates {
            let claimed = sqlx::query(
                r#"
                UPDATE chat_sessions SET status = 'active', updated_at = ?
                WHERE session_id = ? AND status = 'pending'
                "#,
            )
            .bind(now)
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

            if claimed.rows_affected() != 1 {
                debug!("Session {} was taken, trying the next one", session_id);
                continue;
            }

            let participant = insert_participant(&mut tx, session_id, user_id, joining_alias).await?;
            let session = sqlx::query_as::<_, ChatSession>(
                "SELECT session_id, status, created_at, updated_at FROM chat_sessions WHERE session_id = ?",
            )
            .bind(session_id)
            .fetch_one(&mut *tx)
            .await?;

            tx.commit().await?;
            info!("User {} joined session {}", user_id, session_id);
            return Ok(Pairing::Joined(session, participant));
        }

        let session = sqlx::query_as::<_, ChatSession>(
            r#"
            INSERT INTO chat_sessions (status, created_at, updated_at)
            VALUES (?, ?, ?)
            RETURNING session_id, status, created_at, updated_at
            "#,
        )
        .bind(SessionStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        let participant =
            insert_participant(&mut tx, session.session_id, user_id, waiting_alias).await?;

        tx.commit().await?;
        debug!("Session {} waiting for a partner", session.session_id);
        Ok(Pairing::Waiting(session, participant))
    }

    /// Ends a session and deletes its messages. `Ok(false)` if it was already ended.
    #[instrument(skip(self))]
    pub async fn end_session(&self, session_id: &i64) -> Result<bool, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let ended = sqlx::query(
            r#"
            UPDATE chat_sessions SET status = 'ended', updated_at = ?
            WHERE session_id = ? AND status != 'ended'
            "#,
        )
        .bind(Utc::now())
        .bind(session_id)
        .execute(&mut *tx)
        .await?;

        if ended.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let purged = sqlx::query("DELETE FROM chat_messages WHERE session_id = ?")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(
            "Session {} ended, {} messages deleted",
            session_id,
            purged.rows_affected()
        );
        Ok(true)
    }

    pub async fn count_by_status(&self, status: SessionStatus) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_sessions WHERE status = ?")
            .bind(status)
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl Read<ChatSession, i64> for ChatSessionRepository {
    async fn read(&self, id: &i64) -> Result<Option<ChatSession>, Error> {
        sqlx::query_as::<_, ChatSession>(
            "SELECT session_id, status, created_at, updated_at FROM chat_sessions WHERE session_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Read<ChatParticipant, (i64, i64)> for ChatSessionRepository {
    /// Keyed by `(session_id, user_id)`
    async fn read(&self, id: &(i64, i64)) -> Result<Option<ChatParticipant>, Error> {
        sqlx::query_as::<_, ChatParticipant>(
            r#"
            SELECT session_id, user_id, alias, joined_at
            FROM chat_participants
            WHERE session_id = ? AND user_id = ?
            "#,
        )
        .bind(id.0)
        .bind(id.1)
        .fetch_optional(&self.connection_pool)
        .await
    }
}
