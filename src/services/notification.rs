//! Notification services - Inbox and admin broadcasts

use crate::core::{AppError, AppState};
use crate::dtos::{
    AdminNotificationDTO, CreateNotificationDTO, NotificationDTO, NotificationInboxDTO,
    NotificationSentDTO, NotificationTarget, PageQuery,
};
use crate::entities::{NotificationKind, User};
use crate::repositories::Read;
use crate::ws::usermap::InternalSignal;
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use axum_macros::debug_handler;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(page): Query<PageQuery>,
) -> Result<Json<NotificationInboxDTO>, AppError> {
    let notifications = state
        .notification
        .find_many_by_user(&current_user.user_id, page.limit())
        .await?;
    let unread = state
        .notification
        .unread_count(&current_user.user_id)
        .await?;

    Ok(Json(NotificationInboxDTO {
        unread,
        notifications: notifications.into_iter().map(NotificationDTO::from).collect(),
    }))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(notification_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !state
        .notification
        .mark_read(&notification_id, &current_user.user_id)
        .await?
    {
        return Err(AppError::not_found("Notifikasi tidak ditemukan"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn mark_all_notifications_read(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<StatusCode, AppError> {
    let updated = state
        .notification
        .mark_all_read(&current_user.user_id)
        .await?;
    info!("{} notifications marked as read", updated);
    Ok(StatusCode::NO_CONTENT)
}

/// Admin composed notification, to one user or to everybody. Reached through the
/// admin middleware.
#[debug_handler]
#[instrument(skip(state, current_user, body), fields(admin_id = %current_user.user_id))]
pub async fn send_admin_notification(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<AdminNotificationDTO>,
) -> Result<(StatusCode, Json<NotificationSentDTO>), AppError> {
    // 1. validate
    body.validate()?;

    // 2. resolve recipients
    let recipients = match body.target {
        NotificationTarget::All => state.user.all_ids().await?,
        NotificationTarget::User(user_id) => {
            state
                .user
                .read(&user_id)
                .await?
                .ok_or_else(|| AppError::not_found("Pengguna tidak ditemukan"))?;
            vec![user_id]
        }
    };

    // 3. store them all in one transaction
    let template = CreateNotificationDTO {
        user_id: current_user.user_id,
        kind: NotificationKind::Admin,
        title: body.title.trim().to_string(),
        message: body.message.trim().to_string(),
        link: body.link.filter(|link| !link.trim().is_empty()),
    };
    let created = state
        .notification
        .create_for_users(&recipients, &template)
        .await?;

    // 4. push to whoever is online
    for notification in created.iter().cloned() {
        let user_id = notification.user_id;
        state.users_online.send_server_message_if_online(
            &user_id,
            InternalSignal::Notification(NotificationDTO::from(notification)),
        );
    }

    info!("Admin notification sent to {} users", created.len());
    Ok((
        StatusCode::CREATED,
        Json(NotificationSentDTO {
            recipients: created.len(),
        }),
    ))
}
