//! PublicCalculation entity - Denormalized copy of a shared calculation

use super::calculation::Material;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct PublicCalculation {
    pub public_id: i64,
    pub calculation_id: i64,
    pub user_id: i64,
    pub author_name: String,
    pub product_name: String,
    pub materials: Json<Vec<Material>>,
    pub hpp: f64,
    pub hpp_per_unit: f64,
    pub suggested_price_per_unit: f64,
    pub margin_percent: f64,
    pub units_produced: i64,
    pub caption: Option<String>,
    pub published_at: DateTime<Utc>,
}
