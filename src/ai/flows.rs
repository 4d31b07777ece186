//! AI flows - Prompt, call, parse

use super::prompts;
use super::{AiError, GenerationRequest, TextGenerator, Turn, parse_structured};
use crate::dtos::{
    CaptionRequestDTO, CoachTurnDTO, ExpenseSummaryDTO, PricingStrategyRequestDTO,
};
use crate::entities::Calculation;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
pub struct HppAnalysis {
    #[validate(length(min = 1))]
    pub summary: String,
    #[validate(length(min = 1, max = 10))]
    pub cost_saving_tips: Vec<String>,
    #[validate(length(min = 1))]
    pub pricing_advice: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
pub struct PricingStrategy {
    #[validate(range(min = 0.0))]
    pub recommended_price: f64,
    #[validate(length(min = 1))]
    pub strategy: String,
    #[validate(length(min = 1))]
    pub reasoning: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
pub struct ExpenseInsight {
    #[validate(length(min = 1))]
    pub insight: String,
    #[validate(length(max = 10))]
    pub saving_suggestions: Vec<String>,
}

/// Free-form coach answer. `history` holds earlier question/answer pairs, oldest first.
#[instrument(skip_all, fields(turns = history.len()))]
pub async fn coach_reply(
    generator: &dyn TextGenerator,
    history: &[CoachTurnDTO],
    message: &str,
) -> Result<String, AiError> {
    let turns = history
        .iter()
        .flat_map(|turn| [Turn::user(&turn.question), Turn::model(&turn.answer)])
        .filter(|turn| !turn.text.trim().is_empty())
        .collect();

    let request = GenerationRequest::new(prompts::COACH_SYSTEM, message.trim()).with_history(turns);
    let reply = generator.generate(request).await?;
    Ok(reply.trim().to_string())
}

#[instrument(skip_all, fields(calculation_id = %calculation.calculation_id))]
pub async fn analyze_calculation(
    generator: &dyn TextGenerator,
    calculation: &Calculation,
) -> Result<HppAnalysis, AiError> {
    let request =
        GenerationRequest::new(prompts::ANALYST_SYSTEM, prompts::hpp_analysis(calculation)).json();
    let reply = generator.generate(request).await?;
    let analysis: HppAnalysis = parse_structured(&reply)?;
    info!("HPP analysis ready with {} tips", analysis.cost_saving_tips.len());
    Ok(analysis)
}

#[instrument(skip_all, fields(product = %input.product_name))]
pub async fn pricing_strategy(
    generator: &dyn TextGenerator,
    input: &PricingStrategyRequestDTO,
) -> Result<PricingStrategy, AiError> {
    let request =
        GenerationRequest::new(prompts::ANALYST_SYSTEM, prompts::pricing_strategy(input)).json();
    let reply = generator.generate(request).await?;
    parse_structured(&reply)
}

#[instrument(skip_all, fields(total = summary.total))]
pub async fn expense_insight(
    generator: &dyn TextGenerator,
    summary: &ExpenseSummaryDTO,
) -> Result<ExpenseInsight, AiError> {
    let request =
        GenerationRequest::new(prompts::ANALYST_SYSTEM, prompts::expense_insight(summary)).json();
    let reply = generator.generate(request).await?;
    parse_structured(&reply)
}

#[instrument(skip_all, fields(product = %input.product_name))]
pub async fn marketing_caption(
    generator: &dyn TextGenerator,
    input: &CaptionRequestDTO,
) -> Result<String, AiError> {
    let request =
        GenerationRequest::new(prompts::COPYWRITER_SYSTEM, prompts::marketing_caption(input));
    let caption = generator.generate(request).await?;
    let caption = caption.trim();
    if caption.is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(caption.to_string())
}
