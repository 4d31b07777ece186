//! UserRepository - Accounts

use super::{Create, Delete, Read, Update};
use crate::dtos::{CreateUserDTO, UpdateUserDTO};
use crate::entities::User;
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::{debug, instrument};

pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> UserRepository {
        Self { connection_pool }
    }

    /// Emails are stored lowercase, lookups normalize the input the same way
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, email, display_name, business_name, password, role, created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }

    /// Page of users, newest first (admin dashboard)
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, email, display_name, business_name, password, role, created_at
            FROM users
            ORDER BY created_at DESC, user_id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn all_ids(&self) -> Result<Vec<i64>, Error> {
        sqlx::query_scalar::<_, i64>("SELECT user_id FROM users ORDER BY user_id")
            .fetch_all(&self.connection_pool)
            .await
    }

    pub async fn count(&self) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    #[instrument(skip(self, data), fields(email = %data.email))]
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        debug!("Inserting user");
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, display_name, business_name, password, role, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING user_id, email, display_name, business_name, password, role, created_at
            "#,
        )
        .bind(data.email.trim().to_lowercase())
        .bind(data.display_name.trim())
        .bind(&data.business_name)
        .bind(&data.password)
        .bind(data.role)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<User, i64> for UserRepository {
    async fn read(&self, id: &i64) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, email, display_name, business_name, password, role, created_at
            FROM users
            WHERE user_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<User, UpdateUserDTO, i64> for UserRepository {
    /// `data.password` must already be a bcrypt hash
    #[instrument(skip(self, data))]
    async fn update(&self, id: &i64, data: &UpdateUserDTO) -> Result<User, Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                display_name = COALESCE(?, display_name),
                business_name = COALESCE(?, business_name),
                password = COALESCE(?, password)
            WHERE user_id = ?
            RETURNING user_id, email, display_name, business_name, password, role, created_at
            "#,
        )
        .bind(data.display_name.as_deref().map(str::trim))
        .bind(&data.business_name)
        .bind(&data.password)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }
}

impl Delete<i64> for UserRepository {
    /// Hard delete, calculations, expenses, feed entries and comments cascade
    async fn delete(&self, id: &i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
