//! Price - Margin versus markup conversions

use super::{CalculatorError, non_negative, percent_of, positive};
use serde::{Deserialize, Serialize};

/// Either `selling_price` or `target_margin_percent` must be set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PriceInput {
    pub cost: f64,
    #[serde(default)]
    pub selling_price: Option<f64>,
    /// margin over selling price, must stay below 100
    #[serde(default)]
    pub target_margin_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResult {
    pub cost: f64,
    pub selling_price: f64,
    pub profit: f64,
    pub margin_percent: f64,
    pub markup_percent: f64,
}

/// Profit as a share of the selling price
pub fn margin_from_price(cost: f64, price: f64) -> f64 {
    percent_of(price - cost, price)
}

/// Profit as a share of the cost
pub fn markup_from_price(cost: f64, price: f64) -> f64 {
    percent_of(price - cost, cost)
}

pub fn price_from_cost(input: &PriceInput) -> Result<PriceResult, CalculatorError> {
    let cost = positive("cost", input.cost)?;

    let selling_price = match (input.selling_price, input.target_margin_percent) {
        (Some(price), _) => positive("selling_price", price)?,
        (None, Some(margin)) => {
            let margin = non_negative("target_margin_percent", margin)?;
            if margin >= 100.0 {
                return Err(CalculatorError::TooLarge {
                    field: "target_margin_percent",
                    max: 99.99,
                });
            }
            cost / (1.0 - margin / 100.0)
        }
        (None, None) => {
            return Err(CalculatorError::NotPositive {
                field: "selling_price",
            });
        }
    };

    Ok(PriceResult {
        cost,
        selling_price,
        profit: selling_price - cost,
        margin_percent: margin_from_price(cost, selling_price),
        markup_percent: markup_from_price(cost, selling_price),
    })
}
