//! ChatMessage entity - Message exchanged inside a chat session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// Content of a chat message, stored as JSON
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessagePayload {
    Text {
        text: String,
    },
    Image {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    SharedCalculation {
        calculation_id: i64,
        product_name: String,
        hpp_per_unit: f64,
        suggested_price_per_unit: f64,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct ChatMessage {
    pub message_id: i64,
    pub session_id: i64,
    pub sender_id: i64,
    pub payload: Json<MessagePayload>,
    pub created_at: DateTime<Utc>,
}
