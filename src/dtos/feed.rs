//! Feed DTOs - Community feed entries and comments

use crate::comment_tree::CommentNode;
use crate::entities::{Material, PublicCalculation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PublicCalculationDTO {
    pub public_id: i64,
    pub calculation_id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub product_name: String,
    pub materials: Vec<Material>,
    pub hpp: f64,
    pub hpp_per_unit: f64,
    pub suggested_price_per_unit: f64,
    pub margin_percent: f64,
    pub units_produced: i64,
    pub caption: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub comment_count: i64,
}

impl From<PublicCalculation> for PublicCalculationDTO {
    fn from(value: PublicCalculation) -> Self {
        Self {
            public_id: value.public_id,
            calculation_id: value.calculation_id,
            author_id: value.user_id,
            author_name: value.author_name,
            product_name: value.product_name,
            materials: value.materials.0,
            hpp: value.hpp,
            hpp_per_unit: value.hpp_per_unit,
            suggested_price_per_unit: value.suggested_price_per_unit,
            margin_percent: value.margin_percent,
            units_produced: value.units_produced,
            caption: value.caption,
            published_at: value.published_at,
            comment_count: 0,
        }
    }
}

/// Feed entry with its comment tree
#[derive(Serialize, Debug, Clone)]
pub struct FeedDetailDTO {
    #[serde(flatten)]
    pub calculation: PublicCalculationDTO,
    pub comments: Vec<CommentNode>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateCommentDTO {
    #[validate(length(min = 1, max = 1000, message = "Komentar harus 1 sampai 1000 karakter"))]
    pub text: String,
    pub parent_id: Option<i64>,
}

/// Insert payload for the comments table
#[derive(Debug, Clone)]
pub struct NewCommentDTO {
    pub public_id: i64,
    pub user_id: i64,
    pub author_name: String,
    pub text: String,
    pub parent_id: Option<i64>,
}
