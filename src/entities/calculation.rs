//! Calculation entity - Saved HPP calculation with derived totals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use validator::Validate;

/// One raw material line. `cost` is the total cost of the line.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Validate)]
pub struct Material {
    #[validate(length(min = 1, max = 100, message = "Nama bahan wajib diisi"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "Biaya bahan tidak boleh negatif"))]
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Jumlah bahan tidak boleh negatif"))]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Calculation {
    pub calculation_id: i64,
    pub user_id: i64,
    pub product_name: String,
    pub materials: Json<Vec<Material>>,
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
