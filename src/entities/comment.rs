//! Comment entity - Feed comment, threaded through parent_id

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, FromRow)]
pub struct Comment {
    pub comment_id: i64,
    pub public_id: i64,
    pub user_id: i64,
    pub author_name: String,
    pub text: String,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
