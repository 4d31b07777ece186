//! NotificationRepository - In-app notifications

use super::{Create, Read};
use crate::dtos::CreateNotificationDTO;
use crate::entities::Notification;
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{info, instrument};

pub struct NotificationRepository {
    connection_pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Latest notifications of a user, newest first
    #[instrument(skip(self))]
    pub async fn find_many_by_user(
        &self,
        user_id: &i64,
        limit: i64,
    ) -> Result<Vec<Notification>, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT notification_id, user_id, kind, title, message, link, is_read, created_at
            FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC, notification_id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn unread_count(&self, user_id: &i64) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(&self.connection_pool)
        .await
    }

    /// Only the owner can mark a notification, `Ok(false)` otherwise
    pub async fn mark_read(&self, notification_id: &i64, user_id: &i64) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE notification_id = ? AND user_id = ?",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.connection_pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_all_read(&self, user_id: &i64) -> Result<u64, Error> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
                .bind(user_id)
                .execute(&self.connection_pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Inserts one notification per recipient in a single transaction, all or nothing
    #[instrument(skip(self, recipients, template), fields(recipients = recipients.len()))]
    pub async fn create_for_users(
        &self,
        recipients: &[i64],
        template: &CreateNotificationDTO,
    ) -> Result<Vec<Notification>, Error> {
        let mut tx = self.connection_pool.begin().await?;
        let now = Utc::now();
        let mut created = Vec::with_capacity(recipients.len());

        for user_id in recipients {
            let notification = sqlx::query_as::<_, Notification>(
                r#"
                INSERT INTO notifications (user_id, kind, title, message, link, is_read, created_at)
                VALUES (?, ?, ?, ?, ?, 0, ?)
                RETURNING notification_id, user_id, kind, title, message, link, is_read, created_at
                "#,
            )
            .bind(user_id)
            .bind(template.kind)
            .bind(&template.title)
            .bind(&template.message)
            .bind(&template.link)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
            created.push(notification);
        }

        tx.commit().await?;
        info!("Created {} notifications", created.len());
        Ok(created)
    }
}

impl Create<Notification, CreateNotificationDTO> for NotificationRepository {
    async fn create(&self, data: &CreateNotificationDTO) -> Result<Notification, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, kind, title, message, link, is_read, created_at)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            RETURNING notification_id, user_id, kind, title, message, link, is_read, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.kind)
        .bind(&data.title)
        .bind(&data.message)
        .bind(&data.link)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Notification, i64> for NotificationRepository {
    async fn read(&self, id: &i64) -> Result<Option<Notification>, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT notification_id, user_id, kind, title, message, link, is_read, created_at
            FROM notifications
            WHERE notification_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}
