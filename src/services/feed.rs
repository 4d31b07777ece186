//! Feed services - Community feed and threaded comments

use crate::comment_tree::{CommentNode, build_comment_tree};
use crate::core::{AppError, AppState};
use crate::dtos::{
    CreateCommentDTO, CreateNotificationDTO, FeedDetailDTO, NewCommentDTO, NotificationDTO,
    PageQuery, PublicCalculationDTO,
};
use crate::entities::{NotificationKind, PublicCalculation, User};
use crate::repositories::{Create, Delete, Read};
use crate::ws::usermap::InternalSignal;
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_macros::debug_handler;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

async fn feed_entry(state: &AppState, public_id: i64) -> Result<PublicCalculation, AppError> {
    state
        .feed
        .read(&public_id)
        .await?
        .ok_or_else(|| AppError::not_found("Postingan tidak ditemukan"))
}

#[instrument(skip(state))]
pub async fn list_feed(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<PublicCalculationDTO>>, AppError> {
    let rows = state.feed.find_page(page.before, page.limit()).await?;
    let entries = rows
        .into_iter()
        .map(|row| {
            let mut dto = PublicCalculationDTO::from(row.entry);
            dto.comment_count = row.comment_count;
            dto
        })
        .collect();
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn get_feed_entry(
    State(state): State<Arc<AppState>>,
    Path(public_id): Path<i64>,
) -> Result<Json<FeedDetailDTO>, AppError> {
    let entry = feed_entry(&state, public_id).await?;
    let comments = state.comment.find_many_by_public(&public_id).await?;

    let mut calculation = PublicCalculationDTO::from(entry);
    calculation.comment_count = comments.len() as i64;

    Ok(Json(FeedDetailDTO {
        calculation,
        comments: build_comment_tree(comments),
    }))
}

/// The author or an admin can take an entry down
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn delete_feed_entry(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(public_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let entry = feed_entry(&state, public_id).await?;
    if entry.user_id != current_user.user_id && !current_user.is_admin() {
        warn!("User tried to delete a feed entry they do not own");
        return Err(AppError::forbidden("Anda tidak dapat menghapus postingan ini"));
    }

    state.feed.delete(&public_id).await?;
    info!("Feed entry {} removed", public_id);
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(public_id): Path<i64>,
) -> Result<Json<Vec<CommentNode>>, AppError> {
    feed_entry(&state, public_id).await?;
    let comments = state.comment.find_many_by_public(&public_id).await?;
    Ok(Json(build_comment_tree(comments)))
}

#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(public_id): Path<i64>,
    Json(body): Json<CreateCommentDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. validate, whitespace only is empty
    body.validate()?;
    if body.text.trim().is_empty() {
        return Err(AppError::bad_request("Komentar tidak boleh kosong"));
    }

    // 2. the entry must exist
    let entry = feed_entry(&state, public_id).await?;

    // 3. a reply must stay in the same entry
    let parent = match body.parent_id {
        Some(parent_id) => {
            let parent = state
                .comment
                .read(&parent_id)
                .await?
                .filter(|parent| parent.public_id == public_id)
                .ok_or_else(|| AppError::bad_request("Komentar yang dibalas tidak ditemukan"))?;
            Some(parent)
        }
        None => None,
    };

    // 4. store
    let comment = state
        .comment
        .create(&NewCommentDTO {
            public_id,
            user_id: current_user.user_id,
            author_name: current_user.display_name.clone(),
            text: body.text,
            parent_id: parent.as_ref().map(|p| p.comment_id),
        })
        .await?;

    // 5. notify the entry author and the author of the replied comment, never oneself
    let recipients: BTreeSet<i64> = std::iter::once(entry.user_id)
        .chain(parent.map(|p| p.user_id))
        .filter(|user_id| *user_id != current_user.user_id)
        .collect();

    for user_id in recipients {
        let template = CreateNotificationDTO {
            user_id,
            kind: NotificationKind::Comment,
            title: "Komentar baru".to_string(),
            message: format!(
                "{} mengomentari \"{}\"",
                current_user.display_name, entry.product_name
            ),
            link: Some(format!("/feed/{}", public_id)),
        };
        let notification = state.notification.create(&template).await?;
        state.users_online.send_server_message_if_online(
            &user_id,
            InternalSignal::Notification(NotificationDTO::from(notification)),
        );
        debug!("Comment notification sent to {}", user_id);
    }

    info!("Comment {} added to entry {}", comment.comment_id, public_id);
    Ok((
        StatusCode::CREATED,
        Json(CommentNode {
            comment,
            replies: Vec::new(),
        }),
    ))
}

/// The comment author, the entry author or an admin can delete; replies go with it
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path((public_id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    let entry = feed_entry(&state, public_id).await?;
    let comment = state
        .comment
        .read(&comment_id)
        .await?
        .filter(|comment| comment.public_id == public_id)
        .ok_or_else(|| AppError::not_found("Komentar tidak ditemukan"))?;

    let allowed = comment.user_id == current_user.user_id
        || entry.user_id == current_user.user_id
        || current_user.is_admin();
    if !allowed {
        return Err(AppError::forbidden("Anda tidak dapat menghapus komentar ini"));
    }

    state.comment.delete(&comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
