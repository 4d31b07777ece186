//! Chat services - Anonymous matchmaking and session messages

use crate::core::{AppError, AppState};
use crate::dtos::{ChatMessageDTO, ChatSessionDTO, MatchResultDTO, MessageBodyDTO, PageQuery};
use crate::entities::{ChatParticipant, User};
use crate::matchmaking;
use axum::{
    Extension,
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn match_user(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<MatchResultDTO>, AppError> {
    Ok(Json(
        matchmaking::find_partner(&state, current_user.user_id).await?,
    ))
}

/// The open session of the caller, `null` when there is none
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_current_session(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Option<ChatSessionDTO>>, AppError> {
    Ok(Json(
        matchmaking::current_session(&state, current_user.user_id).await?,
    ))
}

// The handlers below sit behind session_participant_middleware, which provides the
// caller's ChatParticipant row.

#[instrument(skip(state, participant), fields(session_id = %participant.session_id))]
pub async fn end_chat_session(
    State(state): State<Arc<AppState>>,
    Extension(participant): Extension<ChatParticipant>,
) -> Result<Json<ChatSessionDTO>, AppError> {
    Ok(Json(matchmaking::end_session(&state, &participant).await?))
}

#[instrument(skip(state, participant), fields(session_id = %participant.session_id))]
pub async fn list_session_messages(
    State(state): State<Arc<AppState>>,
    Extension(participant): Extension<ChatParticipant>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<ChatMessageDTO>>, AppError> {
    Ok(Json(
        matchmaking::message_history(&state, participant.session_id, &page).await?,
    ))
}

#[instrument(skip(state, participant, body), fields(session_id = %participant.session_id))]
pub async fn send_session_message(
    State(state): State<Arc<AppState>>,
    Extension(participant): Extension<ChatParticipant>,
    Json(body): Json<MessageBodyDTO>,
) -> Result<impl IntoResponse, AppError> {
    let message = matchmaking::send_message(&state, &participant, body.payload).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
