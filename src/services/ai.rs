//! AI services - Business coach and analyses

use crate::ai::{ExpenseInsight, HppAnalysis, PricingStrategy, flows, prompts};
use crate::core::{AppError, AppState};
use crate::dtos::{
    CaptionDTO, CaptionRequestDTO, CoachReplyDTO, CoachRequestDTO, ExpenseQuery,
    PricingStrategyRequestDTO,
};
use crate::entities::User;
use crate::services::calculation::owned_calculation;
use crate::services::expense::{build_summary, check_range};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
};
use std::sync::Arc;
use tracing::{error, instrument};
use validator::Validate;

/// A failing model does not fail the chat: the coach answers with an apology instead
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn coach_chat(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CoachRequestDTO>,
) -> Result<Json<CoachReplyDTO>, AppError> {
    body.validate()?;

    let reply = match flows::coach_reply(state.ai.as_ref(), &body.history, &body.message).await {
        Ok(reply) => CoachReplyDTO {
            reply,
            fallback: false,
        },
        Err(e) => {
            error!("Coach reply failed: {}", e);
            CoachReplyDTO {
                reply: prompts::COACH_FALLBACK.to_string(),
                fallback: true,
            }
        }
    };
    Ok(Json(reply))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn analyze_calculation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(calculation_id): Path<i64>,
) -> Result<Json<HppAnalysis>, AppError> {
    let calculation = owned_calculation(&state, calculation_id, current_user.user_id).await?;
    let analysis = flows::analyze_calculation(state.ai.as_ref(), &calculation).await?;
    Ok(Json(analysis))
}

#[instrument(skip(state, body))]
pub async fn suggest_pricing_strategy(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PricingStrategyRequestDTO>,
) -> Result<Json<PricingStrategy>, AppError> {
    body.validate()?;
    let strategy = flows::pricing_strategy(state.ai.as_ref(), &body).await?;
    Ok(Json(strategy))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn expense_insight(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(filter): Query<ExpenseQuery>,
) -> Result<Json<ExpenseInsight>, AppError> {
    check_range(&filter)?;
    let summary = build_summary(&state, current_user.user_id, &filter).await?;
    if summary.count == 0 {
        return Err(AppError::bad_request(
            "Belum ada pengeluaran untuk dianalisis pada periode ini",
        ));
    }
    let insight = flows::expense_insight(state.ai.as_ref(), &summary).await?;
    Ok(Json(insight))
}

#[instrument(skip(state, body))]
pub async fn generate_caption(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CaptionRequestDTO>,
) -> Result<Json<CaptionDTO>, AppError> {
    body.validate()?;
    let caption = flows::marketing_caption(state.ai.as_ref(), &body).await?;
    Ok(Json(CaptionDTO { caption }))
}
