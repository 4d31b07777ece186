//! CommentRepository - Comments on feed entries

use super::{Create, Delete, Read};
use crate::dtos::NewCommentDTO;
use crate::entities::Comment;
use chrono::Utc;
use sqlx::{Error, SqlitePool};
use tracing::instrument;

pub struct CommentRepository {
    connection_pool: SqlitePool,
}

impl CommentRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Flat list of every comment on a feed entry, oldest first.
    /// Nesting is rebuilt by [`crate::comment_tree::build_comment_tree`].
    #[instrument(skip(self))]
    pub async fn find_many_by_public(&self, public_id: &i64) -> Result<Vec<Comment>, Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT comment_id, public_id, user_id, author_name, text, parent_id, created_at
            FROM comments
            WHERE public_id = ?
            ORDER BY created_at ASC, comment_id ASC
            "#,
        )
        .bind(public_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn rename_author(&self, user_id: &i64, author_name: &str) -> Result<u64, Error> {
        let result = sqlx::query("UPDATE comments SET author_name = ? WHERE user_id = ?")
            .bind(author_name)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl Create<Comment, NewCommentDTO> for CommentRepository {
    #[instrument(skip(self, data), fields(public_id = %data.public_id, user_id = %data.user_id))]
    async fn create(&self, data: &NewCommentDTO) -> Result<Comment, Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (public_id, user_id, author_name, text, parent_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING comment_id, public_id, user_id, author_name, text, parent_id, created_at
            "#,
        )
        .bind(data.public_id)
        .bind(data.user_id)
        .bind(&data.author_name)
        .bind(data.text.trim())
        .bind(data.parent_id)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Comment, i64> for CommentRepository {
    async fn read(&self, id: &i64) -> Result<Option<Comment>, Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT comment_id, public_id, user_id, author_name, text, parent_id, created_at
            FROM comments
            WHERE comment_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Delete<i64> for CommentRepository {
    /// Replies cascade through `parent_id`
    async fn delete(&self, id: &i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM comments WHERE comment_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
