//! HPP - Harga Pokok Produksi and suggested selling price

use super::{CalculatorError, non_negative};
use crate::entities::Material;
use serde::{Deserialize, Serialize};

pub const MAX_MARGIN_PERCENT: f64 = 1000.0;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HppInput {
    pub materials: Vec<Material>,
    pub labor_cost: f64,
    pub overhead_cost: f64,
    pub packaging_cost: f64,
    pub margin_percent: f64,
    #[serde(default = "default_units")]
    pub units_produced: i64,
}

fn default_units() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HppBreakdown {
    pub material_cost: f64,
    pub labor_cost: f64,
    pub overhead_cost: f64,
    pub packaging_cost: f64,
    pub hpp: f64,
    pub hpp_per_unit: f64,
    pub margin_percent: f64,
    pub suggested_price: f64,
    pub suggested_price_per_unit: f64,
    pub profit_per_unit: f64,
}

/// HPP = sum(materials) + labor + overhead + packaging
pub fn compute_hpp(input: &HppInput) -> Result<HppBreakdown, CalculatorError> {
    let mut material_cost = 0.0;
    for material in &input.materials {
        material_cost += non_negative("material cost", material.cost)?;
    }
    let labor_cost = non_negative("labor_cost", input.labor_cost)?;
    let overhead_cost = non_negative("overhead_cost", input.overhead_cost)?;
    let packaging_cost = non_negative("packaging_cost", input.packaging_cost)?;

    if input.units_produced < 1 {
        return Err(CalculatorError::NotPositive {
            field: "units_produced",
        });
    }
    let units = input.units_produced as f64;

    let hpp = material_cost + labor_cost + overhead_cost + packaging_cost;
    let suggested = suggested_price(hpp, input.margin_percent)?;

    Ok(HppBreakdown {
        material_cost,
        labor_cost,
        overhead_cost,
        packaging_cost,
        hpp,
        hpp_per_unit: hpp / units,
        margin_percent: input.margin_percent,
        suggested_price: suggested,
        suggested_price_per_unit: suggested / units,
        profit_per_unit: (suggested - hpp) / units,
    })
}

/// suggestedPrice = HPP x (1 + margin/100)
pub fn suggested_price(hpp: f64, margin_percent: f64) -> Result<f64, CalculatorError> {
    let hpp = non_negative("hpp", hpp)?;
    let margin = non_negative("margin_percent", margin_percent)?;
    if margin > MAX_MARGIN_PERCENT {
        return Err(CalculatorError::TooLarge {
            field: "margin_percent",
            max: MAX_MARGIN_PERCENT,
        });
    }
    Ok(hpp * (1.0 + margin / 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(name: &str, cost: f64) -> Material {
        Material {
            name: name.to_string(),
            cost,
            quantity: None,
            unit: None,
        }
    }

    fn input(materials: Vec<Material>) -> HppInput {
        HppInput {
            materials,
            labor_cost: 20_000.0,
            overhead_cost: 5_000.0,
            packaging_cost: 3_000.0,
            margin_percent: 30.0,
            units_produced: 10,
        }
    }

    #[test]
    fn test_hpp_is_sum_of_materials_and_costs() {
        let result = compute_hpp(&input(vec![
            material("Tepung", 12_000.0),
            material("Gula", 8_000.0),
        ]))
        .unwrap();

        assert_eq!(result.material_cost, 20_000.0);
        assert_eq!(result.hpp, 48_000.0);
        assert_eq!(result.hpp_per_unit, 4_800.0);
    }

    #[test]
    fn test_suggested_price_applies_margin() {
        let result = compute_hpp(&input(vec![material("Tepung", 52_000.0)])).unwrap();

        // hpp = 80_000, margin 30%
        assert!((result.suggested_price - 104_000.0).abs() < 1e-6);
        assert!((result.suggested_price_per_unit - 10_400.0).abs() < 1e-6);
        assert!((result.profit_per_unit - 2_400.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_materials_is_allowed() {
        let result = compute_hpp(&input(vec![])).unwrap();
        assert_eq!(result.material_cost, 0.0);
        assert_eq!(result.hpp, 28_000.0);
    }

    #[test]
    fn test_negative_costs_are_rejected() {
        let mut bad = input(vec![material("Tepung", 1_000.0)]);
        bad.labor_cost = -1.0;
        assert_eq!(
            compute_hpp(&bad),
            Err(CalculatorError::Negative { field: "labor_cost" })
        );

        let bad = input(vec![material("Minyak", -5.0)]);
        assert!(matches!(
            compute_hpp(&bad),
            Err(CalculatorError::Negative { .. })
        ));
    }

    #[test]
    fn test_zero_units_is_rejected() {
        let mut bad = input(vec![]);
        bad.units_produced = 0;
        assert!(matches!(
            compute_hpp(&bad),
            Err(CalculatorError::NotPositive { field: "units_produced" })
        ));
    }

    #[test]
    fn test_margin_bounds() {
        assert_eq!(suggested_price(10_000.0, 0.0).unwrap(), 10_000.0);
        assert!(suggested_price(10_000.0, -5.0).is_err());
        assert!(suggested_price(10_000.0, 1_500.0).is_err());
    }
}
