//! WebSocket Event Handlers - Frames sent by the client

use crate::core::AppError;
use crate::dtos::SendMessageDTO;
use crate::matchmaking;
use crate::repositories::Read;
use crate::AppState;
use tracing::{instrument, warn};

/// A chat frame goes through the same path as `POST /chat/sessions/{id}/messages`:
/// membership check, persistence, fan-out on the session channel
#[instrument(skip(state, event), fields(session_id = event.session_id))]
pub async fn process_message(
    state: &AppState,
    user_id: i64,
    event: SendMessageDTO,
) -> Result<(), AppError> {
    let participant = state
        .session
        .read(&(event.session_id, user_id))
        .await?
        .ok_or_else(|| {
            warn!("User {} wrote to a session they are not part of", user_id);
            AppError::forbidden("Anda bukan peserta sesi chat ini")
        })?;

    matchmaking::send_message(state, &participant, event.payload).await?;
    Ok(())
}
