//! User services - Own profile

use crate::core::{AppError, AppState};
use crate::dtos::{UpdateUserDTO, UserDTO};
use crate::entities::User;
use crate::matchmaking;
use crate::repositories::{Delete, Read, Update};
use axum::{
    Extension,
    extract::{Json, State},
    http::StatusCode,
};
use axum_macros::debug_handler;
use futures::future;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

#[instrument(skip(current_user), fields(user_id = %current_user.user_id))]
pub async fn get_my_profile(Extension(current_user): Extension<User>) -> Json<UserDTO> {
    Json(UserDTO::from(current_user))
}

#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<UpdateUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    // 1. validate only the fields that are present
    body.validate()?;

    // 2. a new password is stored hashed
    let password = match &body.password {
        Some(password) => Some(
            User::hash_password(password)
                .map_err(|_| AppError::internal_server_error("Gagal memproses kata sandi"))?,
        ),
        None => None,
    };

    let update = UpdateUserDTO {
        display_name: body.display_name,
        business_name: body.business_name,
        password,
    };
    let updated = state.user.update(&current_user.user_id, &update).await?;

    // 3. feed entries and comments carry the author name
    if updated.display_name != current_user.display_name {
        let (entries, comments) = future::try_join(
            state
                .feed
                .rename_author(&updated.user_id, &updated.display_name),
            state
                .comment
                .rename_author(&updated.user_id, &updated.display_name),
        )
        .await?;
        debug!("Author name refreshed on {} entries, {} comments", entries, comments);
    }

    info!("Profile updated");
    Ok(Json(UserDTO::from(updated)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn delete_my_account(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<StatusCode, AppError> {
    // 1. end the open chat session so the partner is told
    if let Some(session) = state
        .session
        .find_open_for_user(&current_user.user_id)
        .await?
    {
        if let Some(participant) = state
            .session
            .read(&(session.session_id, current_user.user_id))
            .await?
        {
            matchmaking::end_session(&state, &participant).await?;
        }
    }

    // 2. delete, owned rows cascade
    if !state.user.delete(&current_user.user_id).await? {
        return Err(AppError::not_found("Akun tidak ditemukan"));
    }

    info!("Account deleted");
    Ok(StatusCode::NO_CONTENT)
}
