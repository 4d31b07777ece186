//! Profit simulation - what a price and sales volume mean for the month

use super::{CalculatorError, non_negative, percent_of, positive};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfitInput {
    pub hpp_per_unit: f64,
    pub selling_price: f64,
    pub units_sold: f64,
    #[serde(default)]
    pub fixed_costs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitResult {
    pub revenue: f64,
    pub total_variable_cost: f64,
    pub gross_profit: f64,
    pub net_profit: f64,
    pub profit_per_unit: f64,
    pub profit_margin_percent: f64,
    pub markup_percent: f64,
    /// `None` when every unit is sold at or below cost
    pub break_even_units: Option<f64>,
}

pub fn simulate_profit(input: &ProfitInput) -> Result<ProfitResult, CalculatorError> {
    let unit_cost = non_negative("hpp_per_unit", input.hpp_per_unit)?;
    let price = positive("selling_price", input.selling_price)?;
    let units = non_negative("units_sold", input.units_sold)?;
    let fixed = non_negative("fixed_costs", input.fixed_costs)?;

    let revenue = price * units;
    let total_variable_cost = unit_cost * units;
    let gross_profit = revenue - total_variable_cost;
    let net_profit = gross_profit - fixed;
    let profit_per_unit = price - unit_cost;

    let break_even_units = if profit_per_unit > 0.0 {
        Some((fixed / profit_per_unit).ceil())
    } else {
        None
    };

    Ok(ProfitResult {
        revenue,
        total_variable_cost,
        gross_profit,
        net_profit,
        profit_per_unit,
        profit_margin_percent: percent_of(profit_per_unit, price),
        markup_percent: percent_of(profit_per_unit, unit_cost),
        break_even_units,
    })
}
