//! Matchmaking - Pairs two users into an anonymous 1:1 chat session
//!
//! A caller first gets back the session they already have open. Otherwise they claim the
//! oldest session someone else is waiting in, or open a new pending one and wait. Ending a
//! session deletes its messages.

use crate::core::{AppError, AppState};
use crate::dtos::{
    ChatMessageDTO, ChatSessionDTO, CreateChatMessageDTO, MatchResultDTO, PageQuery,
};
use crate::entities::{ChatMessage, ChatParticipant, ChatSession, MessagePayload, SessionStatus};
use crate::repositories::{Create, Pairing, Read};
use crate::ws::usermap::InternalSignal;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

pub const WAITING_ALIAS: &str = "Anonim 1";
pub const JOINING_ALIAS: &str = "Anonim 2";
pub const MAX_TEXT_CHARS: usize = 2000;
const MAX_URL_CHARS: usize = 500;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatchmakingError {
    #[error("session is not active")]
    NotActive,
    #[error("message text is empty")]
    EmptyMessage,
    #[error("message text is longer than {max} characters")]
    MessageTooLong { max: usize },
    #[error("image url must be an http(s) url of at most {max} characters")]
    InvalidImageUrl { max: usize },
    #[error("only your own calculations can be shared")]
    ForeignCalculation,
}

impl From<MatchmakingError> for AppError {
    fn from(err: MatchmakingError) -> Self {
        let details = err.to_string();
        let base = match err {
            MatchmakingError::NotActive => {
                AppError::conflict("Sesi chat belum aktif atau sudah berakhir")
            }
            MatchmakingError::ForeignCalculation => {
                AppError::forbidden("Perhitungan ini bukan milik Anda")
            }
            _ => AppError::bad_request("Pesan tidak valid"),
        };
        base.with_details(details)
    }
}

/// The session as seen by `user_id`: their alias and, once matched, the partner's
pub fn session_view(
    session: &ChatSession,
    participants: &[ChatParticipant],
    user_id: i64,
) -> ChatSessionDTO {
    let my_alias = participants
        .iter()
        .find(|p| p.user_id == user_id)
        .map(|p| p.alias.clone())
        .unwrap_or_else(|| WAITING_ALIAS.to_string());
    let partner_alias = participants
        .iter()
        .find(|p| p.user_id != user_id)
        .map(|p| p.alias.clone());
    ChatSessionDTO::new(session, my_alias, partner_alias)
}

/// The user's open session, if any
pub async fn current_session(
    state: &AppState,
    user_id: i64,
) -> Result<Option<ChatSessionDTO>, AppError> {
    let Some(session) = state.session.find_open_for_user(&user_id).await? else {
        return Ok(None);
    };
    let participants = state.session.participants(&session.session_id).await?;
    Ok(Some(session_view(&session, &participants, user_id)))
}

#[instrument(skip(state))]
pub async fn find_partner(state: &AppState, user_id: i64) -> Result<MatchResultDTO, AppError> {
    // 1. one open session per user
    if let Some(existing) = current_session(state, user_id).await? {
        debug!("User already in session {}", existing.session_id);
        return Ok(MatchResultDTO::Existing(existing));
    }

    // 2. join someone who is waiting, or wait ourselves
    let (session, participant) = match state
        .session
        .pair_or_wait(&user_id, JOINING_ALIAS, WAITING_ALIAS)
        .await?
    {
        Pairing::Joined(session, participant) => (session, participant),
        Pairing::Waiting(session, participant) => {
            return Ok(MatchResultDTO::Waiting(ChatSessionDTO::new(
                &session,
                participant.alias,
                None,
            )));
        }
    };

    // 3. tell both sides
    let participants = state.session.participants(&participant.session_id).await?;
    for other in participants.iter().filter(|p| p.user_id != user_id) {
        let view = session_view(&session, &participants, other.user_id);
        state
            .users_online
            .send_server_message_if_online(&other.user_id, InternalSignal::SessionMatched(view));
    }

    let mine = session_view(&session, &participants, user_id);
    state
        .users_online
        .send_server_message_if_online(&user_id, InternalSignal::SessionMatched(mine.clone()));

    info!("Session {} matched", session.session_id);
    Ok(MatchResultDTO::Matched(mine))
}

/// Ends (or cancels, while pending) the participant's session and tells everyone in it
#[instrument(skip(state, participant), fields(session_id = participant.session_id))]
pub async fn end_session(
    state: &AppState,
    participant: &ChatParticipant,
) -> Result<ChatSessionDTO, AppError> {
    let session_id = participant.session_id;
    let participants = state.session.participants(&session_id).await?;

    if state.session.end_session(&session_id).await? {
        state.sessions_online.remove(&session_id);
        for p in &participants {
            state
                .users_online
                .send_server_message_if_online(&p.user_id, InternalSignal::SessionEnded(session_id));
        }
    } else {
        debug!("Session was already ended");
    }

    let session = state
        .session
        .read(&session_id)
        .await?
        .ok_or_else(|| AppError::not_found("Sesi chat tidak ditemukan"))?;
    Ok(session_view(&session, &participants, participant.user_id))
}

/// Checks the payload and replaces client supplied calculation figures with stored ones
async fn normalize_payload(
    state: &AppState,
    sender_id: i64,
    payload: MessagePayload,
) -> Result<MessagePayload, AppError> {
    match payload {
        MessagePayload::Text { text } => {
            let text = text.trim();
            if text.is_empty() {
                return Err(MatchmakingError::EmptyMessage.into());
            }
            if text.chars().count() > MAX_TEXT_CHARS {
                return Err(MatchmakingError::MessageTooLong {
                    max: MAX_TEXT_CHARS,
                }
                .into());
            }
            Ok(MessagePayload::Text {
                text: text.to_string(),
            })
        }
        MessagePayload::Image { url, caption } => {
            let url = url.trim();
            let is_http = url.starts_with("https://") || url.starts_with("http://");
            if !is_http || url.len() > MAX_URL_CHARS {
                return Err(MatchmakingError::InvalidImageUrl { max: MAX_URL_CHARS }.into());
            }
            let caption = caption
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty());
            if caption
                .as_ref()
                .is_some_and(|c| c.chars().count() > MAX_TEXT_CHARS)
            {
                return Err(MatchmakingError::MessageTooLong {
                    max: MAX_TEXT_CHARS,
                }
                .into());
            }
            Ok(MessagePayload::Image {
                url: url.to_string(),
                caption,
            })
        }
        MessagePayload::SharedCalculation { calculation_id, .. } => {
            let calculation = state
                .calculation
                .read(&calculation_id)
                .await?
                .ok_or_else(|| AppError::not_found("Perhitungan tidak ditemukan"))?;
            if calculation.user_id != sender_id {
                return Err(MatchmakingError::ForeignCalculation.into());
            }
            Ok(MessagePayload::SharedCalculation {
                calculation_id,
                product_name: calculation.product_name,
                hpp_per_unit: calculation.hpp_per_unit,
                suggested_price_per_unit: calculation.suggested_price_per_unit,
            })
        }
    }
}

fn to_dto(message: ChatMessage, sender_alias: String) -> ChatMessageDTO {
    ChatMessageDTO {
        message_id: message.message_id,
        session_id: message.session_id,
        sender_alias,
        payload: message.payload.0,
        created_at: message.created_at,
    }
}

/// Stores a message of an active session and fans it out to the online participants
#[instrument(skip(state, participant, payload), fields(session_id = participant.session_id))]
pub async fn send_message(
    state: &AppState,
    participant: &ChatParticipant,
    payload: MessagePayload,
) -> Result<Arc<ChatMessageDTO>, AppError> {
    let session = state
        .session
        .read(&participant.session_id)
        .await?
        .ok_or_else(|| AppError::not_found("Sesi chat tidak ditemukan"))?;
    if session.status != SessionStatus::Active {
        return Err(MatchmakingError::NotActive.into());
    }

    let payload = normalize_payload(state, participant.user_id, payload).await?;
    let message = state
        .msg
        .create(&CreateChatMessageDTO {
            session_id: session.session_id,
            sender_id: participant.user_id,
            payload,
            created_at: Utc::now(),
        })
        .await?;

    let dto = Arc::new(to_dto(message, participant.alias.clone()));
    if state
        .sessions_online
        .send(&session.session_id, dto.clone())
        .is_err()
    {
        debug!("Nobody online in the session, message only stored");
    }
    Ok(dto)
}

/// Page of a session's history, sender ids replaced by aliases
pub async fn message_history(
    state: &AppState,
    session_id: i64,
    page: &PageQuery,
) -> Result<Vec<ChatMessageDTO>, AppError> {
    let aliases: HashMap<i64, String> = state
        .session
        .participants(&session_id)
        .await?
        .into_iter()
        .map(|p| (p.user_id, p.alias))
        .collect();

    let messages = state
        .msg
        .find_page(&session_id, page.before, page.limit())
        .await?;

    Ok(messages
        .into_iter()
        .map(|m| {
            let alias = aliases
                .get(&m.sender_id)
                .cloned()
                .unwrap_or_else(|| "Anonim".to_string());
            to_dto(m, alias)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::DisabledGenerator;
    use crate::dtos::CreateUserDTO;
    use crate::entities::UserRole;
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::time::Duration;

    async fn state() -> AppState {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        AppState::new(pool, "secret".to_string(), Arc::new(DisabledGenerator))
    }

    async fn user(state: &AppState, name: &str) -> i64 {
        state
            .user
            .create(&CreateUserDTO {
                email: format!("{name}@umkm.id"),
                display_name: name.to_string(),
                business_name: None,
                password: "hash".to_string(),
                role: UserRole::User,
            })
            .await
            .unwrap()
            .user_id
    }

    fn session_id(result: &MatchResultDTO) -> i64 {
        match result {
            MatchResultDTO::Waiting(s) | MatchResultDTO::Matched(s) | MatchResultDTO::Existing(s) => {
                s.session_id
            }
        }
    }

    #[tokio::test]
    async fn test_first_waits_second_matches_third_waits_alone() {
        let state = state().await;
        let (a, b, c) = (
            user(&state, "ani").await,
            user(&state, "budi").await,
            user(&state, "citra").await,
        );

        let first = find_partner(&state, a).await.unwrap();
        assert!(matches!(first, MatchResultDTO::Waiting(_)));

        let second = find_partner(&state, b).await.unwrap();
        let MatchResultDTO::Matched(ref view) = second else {
            panic!("expected a match, got {second:?}");
        };
        assert_eq!(view.session_id, session_id(&first));
        assert_eq!(view.status, SessionStatus::Active);
        assert_eq!(view.my_alias, JOINING_ALIAS);
        assert_eq!(view.partner_alias.as_deref(), Some(WAITING_ALIAS));

        let third = find_partner(&state, c).await.unwrap();
        assert!(matches!(third, MatchResultDTO::Waiting(_)));
        assert_ne!(session_id(&third), session_id(&first));
    }

    #[tokio::test]
    async fn test_repeated_call_returns_existing_session() {
        let state = state().await;
        let a = user(&state, "ani").await;

        let first = find_partner(&state, a).await.unwrap();
        let again = find_partner(&state, a).await.unwrap();
        assert!(matches!(again, MatchResultDTO::Existing(_)));
        assert_eq!(session_id(&first), session_id(&again));
    }

    #[tokio::test]
    async fn test_ending_session_deletes_messages() {
        let state = state().await;
        let (a, b) = (user(&state, "ani").await, user(&state, "budi").await);
        find_partner(&state, a).await.unwrap();
        let id = session_id(&find_partner(&state, b).await.unwrap());

        let participant = state.session.read(&(id, a)).await.unwrap().unwrap();
        let sent = send_message(
            &state,
            &participant,
            MessagePayload::Text {
                text: " halo ".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(sent.sender_alias, WAITING_ALIAS);
        assert_eq!(
            sent.payload,
            MessagePayload::Text {
                text: "halo".to_string()
            }
        );

        let ended = end_session(&state, &participant).await.unwrap();
        assert_eq!(ended.status, SessionStatus::Ended);

        let history = message_history(&state, id, &PageQuery::default())
            .await
            .unwrap();
        assert!(history.is_empty());

        let err = send_message(
            &state,
            &participant,
            MessagePayload::Text {
                text: "masih ada?".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_pending_session_rejects_messages() {
        let state = state().await;
        let a = user(&state, "ani").await;
        let id = session_id(&find_partner(&state, a).await.unwrap());
        let participant = state.session.read(&(id, a)).await.unwrap().unwrap();

        let err = send_message(
            &state,
            &participant,
            MessagePayload::Text {
                text: "ada orang?".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_pair_up_without_overfilling() {
        let dir = tempfile::tempdir().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("genhpp.db"))
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));
        let pool = SqlitePoolOptions::new()
            .max_connections(16)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        let state = Arc::new(AppState::new(
            pool.clone(),
            "secret".to_string(),
            Arc::new(DisabledGenerator),
        ));

        let mut waiter_sessions = Vec::new();
        for i in 0..4 {
            let id = user(&state, &format!("waiter{i}")).await;
            let result = find_partner(&state, id).await.unwrap();
            assert!(matches!(result, MatchResultDTO::Waiting(_)));
            waiter_sessions.push(session_id(&result));
        }

        let mut callers = Vec::new();
        for i in 0..20 {
            callers.push(user(&state, &format!("caller{i}")).await);
        }

        let handles: Vec<_> = callers
            .into_iter()
            .map(|id| {
                let state = state.clone();
                tokio::spawn(async move { find_partner(&state, id).await })
            })
            .collect();
        for result in futures::future::join_all(handles).await {
            let outcome = result.unwrap();
            assert!(outcome.is_ok(), "match call failed: {outcome:?}");
        }

        let max_participants: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(n), 0) FROM (SELECT COUNT(*) AS n FROM chat_participants GROUP BY session_id)",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(max_participants, 2);

        // 24 users pair up completely, nobody is left waiting
        assert_eq!(state.session.count_by_status(SessionStatus::Pending).await.unwrap(), 0);
        assert_eq!(state.session.count_by_status(SessionStatus::Active).await.unwrap(), 12);
        for id in waiter_sessions {
            let session: ChatSession = state.session.read(&id).await.unwrap().unwrap();
            assert_eq!(session.status, SessionStatus::Active);
        }
    }
}
