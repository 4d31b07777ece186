//! Admin services - Dashboard, behind admin_middleware

use crate::core::{AppError, AppState};
use crate::dtos::{AdminStatsDTO, CalculationDTO, OffsetQuery, UserDTO};
use crate::entities::SessionStatus;
use axum::extract::{Json, Query, State};
use std::sync::Arc;
use tracing::instrument;

#[instrument(skip(state))]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<AdminStatsDTO>, AppError> {
    Ok(Json(AdminStatsDTO {
        users: state.user.count().await?,
        calculations: state.calculation.count().await?,
        published_calculations: state.feed.count().await?,
        expenses_total: state.expense.total_amount().await?,
        sessions_waiting: state.session.count_by_status(SessionStatus::Pending).await?,
        sessions_active: state.session.count_by_status(SessionStatus::Active).await?,
        users_online: state.users_online.online_count(),
    }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(page): Query<OffsetQuery>,
) -> Result<Json<Vec<UserDTO>>, AppError> {
    let users = state.user.list(page.limit(), page.offset()).await?;
    Ok(Json(users.into_iter().map(UserDTO::from).collect()))
}

#[instrument(skip(state))]
pub async fn list_recent_calculations(
    State(state): State<Arc<AppState>>,
    Query(page): Query<OffsetQuery>,
) -> Result<Json<Vec<CalculationDTO>>, AppError> {
    let calculations = state.calculation.list_recent(page.limit()).await?;
    Ok(Json(
        calculations.into_iter().map(CalculationDTO::from).collect(),
    ))
}
