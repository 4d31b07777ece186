//! Calculator services - Stateless calculators, nothing is stored

use crate::calculators::{
    AdsInput, AdsResult, HppBreakdown, LoanInput, LoanResult, PriceInput, PriceResult,
    ProfitInput, ProfitResult, amortize, compute_hpp, price_from_cost, simulate_ads,
    simulate_profit,
};
use crate::core::AppError;
use crate::dtos::CalculationFormDTO;
use axum::extract::Json;
use tracing::instrument;
use validator::Validate;

#[instrument(skip(body))]
pub async fn calculate_hpp(
    Json(body): Json<CalculationFormDTO>,
) -> Result<Json<HppBreakdown>, AppError> {
    body.validate()?;
    Ok(Json(compute_hpp(&body.to_hpp_input())?))
}

#[instrument]
pub async fn calculate_profit(
    Json(body): Json<ProfitInput>,
) -> Result<Json<ProfitResult>, AppError> {
    Ok(Json(simulate_profit(&body)?))
}

#[instrument]
pub async fn calculate_loan(Json(body): Json<LoanInput>) -> Result<Json<LoanResult>, AppError> {
    Ok(Json(amortize(&body)?))
}

#[instrument]
pub async fn calculate_ads(Json(body): Json<AdsInput>) -> Result<Json<AdsResult>, AppError> {
    Ok(Json(simulate_ads(&body)?))
}

#[instrument]
pub async fn calculate_price(
    Json(body): Json<PriceInput>,
) -> Result<Json<PriceResult>, AppError> {
    Ok(Json(price_from_cost(&body)?))
}
