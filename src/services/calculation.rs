//! Calculation services - Saved HPP calculations and sharing to the feed

use crate::calculators::compute_hpp;
use crate::core::{AppError, AppState};
use crate::dtos::{
    CalculationDTO, CalculationFormDTO, CalculationRecordDTO, PublicCalculationDTO,
    PublishCalculationDTO,
};
use crate::entities::{Calculation, User};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_macros::debug_handler;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Calculations of other users are reported as missing
pub(crate) async fn owned_calculation(
    state: &AppState,
    calculation_id: i64,
    user_id: i64,
) -> Result<Calculation, AppError> {
    match state.calculation.read(&calculation_id).await? {
        Some(calculation) if calculation.user_id == user_id => Ok(calculation),
        Some(_) => {
            warn!("User {} asked for calculation {} of someone else", user_id, calculation_id);
            Err(AppError::not_found("Perhitungan tidak ditemukan"))
        }
        None => Err(AppError::not_found("Perhitungan tidak ditemukan")),
    }
}

fn record_from_form(user_id: i64, form: CalculationFormDTO) -> Result<CalculationRecordDTO, AppError> {
    form.validate()?;
    let breakdown = compute_hpp(&form.to_hpp_input())?;
    Ok(CalculationRecordDTO::new(user_id, form, breakdown))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_calculation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CalculationFormDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. validate and compute the breakdown server side
    let record = record_from_form(current_user.user_id, body)?;

    // 2. store form and results together
    let created = state.calculation.create(&record).await?;
    info!("Calculation {} saved", created.calculation_id);

    Ok((StatusCode::CREATED, Json(CalculationDTO::from(created))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_calculations(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<CalculationDTO>>, AppError> {
    let calculations = state
        .calculation
        .find_many_by_user(&current_user.user_id)
        .await?;
    Ok(Json(
        calculations.into_iter().map(CalculationDTO::from).collect(),
    ))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_calculation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(calculation_id): Path<i64>,
) -> Result<Json<CalculationDTO>, AppError> {
    let calculation = owned_calculation(&state, calculation_id, current_user.user_id).await?;
    Ok(Json(CalculationDTO::from(calculation)))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn update_calculation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(calculation_id): Path<i64>,
    Json(body): Json<CalculationFormDTO>,
) -> Result<Json<CalculationDTO>, AppError> {
    // 1. ownership
    owned_calculation(&state, calculation_id, current_user.user_id).await?;

    // 2. recompute and store
    let record = record_from_form(current_user.user_id, body)?;
    let updated = state.calculation.update(&calculation_id, &record).await?;

    // 3. a published snapshot follows its calculation
    if state.feed.sync_with_calculation(&updated).await? {
        debug!("Published snapshot refreshed");
    }

    Ok(Json(CalculationDTO::from(updated)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn delete_calculation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(calculation_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    owned_calculation(&state, calculation_id, current_user.user_id).await?;
    // the feed entry and its comments cascade
    state.calculation.delete(&calculation_id).await?;
    info!("Calculation {} deleted", calculation_id);
    Ok(StatusCode::NO_CONTENT)
}

#[debug_handler]
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn publish_calculation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(calculation_id): Path<i64>,
    body: Option<Json<PublishCalculationDTO>>,
) -> Result<impl IntoResponse, AppError> {
    // 1. an empty body publishes without caption
    let body = body.map(|Json(body)| body).unwrap_or_default();
    body.validate()?;

    // 2. only own calculations can be shared
    let calculation = owned_calculation(&state, calculation_id, current_user.user_id).await?;

    // 3. upsert the public snapshot
    let already_published = state
        .feed
        .find_by_calculation(&calculation_id)
        .await?
        .is_some();
    let caption = body
        .caption
        .as_deref()
        .map(str::trim)
        .filter(|caption| !caption.is_empty());
    let entry = state
        .feed
        .publish(&calculation, &current_user.display_name, caption)
        .await?;

    info!("Calculation {} published as entry {}", calculation_id, entry.public_id);
    let status = if already_published {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(PublicCalculationDTO::from(entry))))
}
