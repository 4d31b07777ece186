//! Notification DTOs

use crate::entities::{Notification, NotificationKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotificationDTO {
    pub notification_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationDTO {
    fn from(value: Notification) -> Self {
        Self {
            notification_id: value.notification_id,
            kind: value.kind,
            title: value.title,
            message: value.message,
            link: value.link,
            is_read: value.is_read,
            created_at: value.created_at,
        }
    }
}

/// Insert payload for the notifications table
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotificationInboxDTO {
    pub unread: i64,
    pub notifications: Vec<NotificationDTO>,
}

#[derive(Debug, Clone)]
pub struct CreateNotificationDTO {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

/// Target of an admin notification
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTarget {
    #[default]
    All,
    User(i64),
}

/// Body of `/api/send-admin-notification`
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct AdminNotificationDTO {
    #[validate(length(min = 1, max = 120, message = "Judul harus 1 sampai 120 karakter"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Pesan harus 1 sampai 2000 karakter"))]
    pub message: String,
    #[validate(length(max = 300))]
    pub link: Option<String>,
    #[serde(default)]
    pub target: NotificationTarget,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NotificationSentDTO {
    pub recipients: usize,
}
