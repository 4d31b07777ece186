//! Ads - Advertising budget simulation

use super::{CalculatorError, non_negative, percent_of, positive};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdsInput {
    pub budget: f64,
    pub cost_per_click: f64,
    /// percent of clicks that become orders
    pub conversion_rate_percent: f64,
    pub selling_price: f64,
    pub hpp_per_unit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdsResult {
    pub clicks: f64,
    pub conversions: f64,
    pub revenue: f64,
    pub gross_profit: f64,
    pub profit_after_ads: f64,
    /// revenue / budget
    pub roas: f64,
    pub cost_per_acquisition: Option<f64>,
    pub roi_percent: f64,
}

pub fn simulate_ads(input: &AdsInput) -> Result<AdsResult, CalculatorError> {
    let budget = positive("budget", input.budget)?;
    let cpc = positive("cost_per_click", input.cost_per_click)?;
    let conversion = non_negative("conversion_rate_percent", input.conversion_rate_percent)?;
    if conversion > 100.0 {
        return Err(CalculatorError::TooLarge {
            field: "conversion_rate_percent",
            max: 100.0,
        });
    }
    let price = non_negative("selling_price", input.selling_price)?;
    let unit_cost = non_negative("hpp_per_unit", input.hpp_per_unit)?;

    let clicks = (budget / cpc).floor();
    let conversions = (clicks * conversion / 100.0).floor();
    let revenue = conversions * price;
    let gross_profit = conversions * (price - unit_cost);
    let profit_after_ads = gross_profit - budget;

    Ok(AdsResult {
        clicks,
        conversions,
        revenue,
        gross_profit,
        profit_after_ads,
        roas: revenue / budget,
        cost_per_acquisition: (conversions > 0.0).then(|| budget / conversions),
        roi_percent: percent_of(profit_after_ads, budget),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ads_simulation() {
        let result = simulate_ads(&AdsInput {
            budget: 500_000.0,
            cost_per_click: 1_000.0,
            conversion_rate_percent: 4.0,
            selling_price: 50_000.0,
            hpp_per_unit: 30_000.0,
        })
        .unwrap();

        assert_eq!(result.clicks, 500.0);
        assert_eq!(result.conversions, 20.0);
        assert_eq!(result.revenue, 1_000_000.0);
        assert_eq!(result.gross_profit, 400_000.0);
        assert_eq!(result.profit_after_ads, -100_000.0);
        assert_eq!(result.roas, 2.0);
        assert_eq!(result.cost_per_acquisition, Some(25_000.0));
        assert_eq!(result.roi_percent, -20.0);
    }

    #[test]
    fn test_no_conversions_has_no_cpa() {
        let result = simulate_ads(&AdsInput {
            budget: 10_000.0,
            cost_per_click: 2_000.0,
            conversion_rate_percent: 1.0,
            selling_price: 50_000.0,
            hpp_per_unit: 30_000.0,
        })
        .unwrap();
        assert_eq!(result.conversions, 0.0);
        assert_eq!(result.cost_per_acquisition, None);
    }

    #[test]
    fn test_conversion_rate_over_100_is_rejected() {
        let err = simulate_ads(&AdsInput {
            budget: 10_000.0,
            cost_per_click: 100.0,
            conversion_rate_percent: 120.0,
            selling_price: 1.0,
            hpp_per_unit: 1.0,
        })
        .unwrap_err();
        assert!(matches!(err, CalculatorError::TooLarge { .. }));
    }
}
