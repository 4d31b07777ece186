//! Calculation DTOs - HPP forms and saved calculation views

use crate::calculators::{HppBreakdown, HppInput};
use crate::entities::{Calculation, Material};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CalculationDTO {
    pub calculation_id: i64,
    pub product_name: String,
    pub materials: Vec<Material>,
    pub labor_cost: f64,
    pub overhead_cost: f64,
    pub packaging_cost: f64,
    pub margin_percent: f64,
    pub units_produced: i64,
    pub hpp: f64,
    pub hpp_per_unit: f64,
    pub suggested_price: f64,
    pub suggested_price_per_unit: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Calculation> for CalculationDTO {
    fn from(value: Calculation) -> Self {
        Self {
            calculation_id: value.calculation_id,
            product_name: value.product_name,
            materials: value.materials.0,
            labor_cost: value.labor_cost,
            overhead_cost: value.overhead_cost,
            packaging_cost: value.packaging_cost,
            margin_percent: value.margin_percent,
            units_produced: value.units_produced,
            hpp: value.hpp,
            hpp_per_unit: value.hpp_per_unit,
            suggested_price: value.suggested_price,
            suggested_price_per_unit: value.suggested_price_per_unit,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// HPP form, used both for saving and for the stateless calculator
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CalculationFormDTO {
    #[validate(length(min = 1, max = 100, message = "Nama produk wajib diisi"))]
    pub product_name: String,

    #[validate(length(max = 100, message = "Maksimal 100 bahan"), nested)]
    pub materials: Vec<Material>,

    #[validate(range(min = 0.0, message = "Biaya tenaga kerja tidak boleh negatif"))]
    pub labor_cost: f64,

    #[validate(range(min = 0.0, message = "Biaya overhead tidak boleh negatif"))]
    pub overhead_cost: f64,

    #[validate(range(min = 0.0, message = "Biaya kemasan tidak boleh negatif"))]
    pub packaging_cost: f64,

    #[validate(range(min = 0.0, max = 1000.0, message = "Margin harus antara 0 dan 1000 persen"))]
    pub margin_percent: f64,

    #[validate(range(min = 1, message = "Jumlah produksi minimal 1"))]
    pub units_produced: Option<i64>,
}

impl CalculationFormDTO {
    pub fn to_hpp_input(&self) -> HppInput {
        HppInput {
            materials: self.materials.clone(),
            labor_cost: self.labor_cost,
            overhead_cost: self.overhead_cost,
            packaging_cost: self.packaging_cost,
            margin_percent: self.margin_percent,
            units_produced: self.units_produced.unwrap_or(1),
        }
    }
}

/// Insert/update payload for the calculations table, derived values included
#[derive(Debug, Clone)]
pub struct CalculationRecordDTO {
    pub user_id: i64,
    pub product_name: String,
    pub materials: Vec<Material>,
    pub margin_percent: f64,
    pub units_produced: i64,
    pub breakdown: HppBreakdown,
}

impl CalculationRecordDTO {
    pub fn new(user_id: i64, form: CalculationFormDTO, breakdown: HppBreakdown) -> Self {
        Self {
            user_id,
            units_produced: form.units_produced.unwrap_or(1),
            product_name: form.product_name.trim().to_string(),
            materials: form.materials,
            margin_percent: form.margin_percent,
            breakdown,
        }
    }
}

/// Share-to-feed form
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct PublishCalculationDTO {
    #[validate(length(max = 500, message = "Keterangan maksimal 500 karakter"))]
    pub caption: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> CalculationFormDTO {
        CalculationFormDTO {
            product_name: "Keripik Singkong".to_string(),
            materials: vec![Material {
                name: "Singkong".to_string(),
                cost: 15_000.0,
                quantity: Some(3.0),
                unit: Some("kg".to_string()),
            }],
            labor_cost: 10_000.0,
            overhead_cost: 2_000.0,
            packaging_cost: 3_000.0,
            margin_percent: 40.0,
            units_produced: Some(20),
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn test_negative_costs_fail_validation() {
        let mut bad = form();
        bad.packaging_cost = -100.0;
        assert!(bad.validate().is_err());

        let mut bad = form();
        bad.materials[0].cost = -1.0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_units_default_to_one() {
        let mut f = form();
        f.units_produced = None;
        assert_eq!(f.to_hpp_input().units_produced, 1);
    }
}
