//! AI DTOs - Requests and responses of the AI flows

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One previous exchange in the coach conversation
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CoachTurnDTO {
    #[validate(length(min = 1, max = 4000))]
    pub question: String,
    #[validate(length(max = 8000))]
    pub answer: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CoachRequestDTO {
    #[validate(length(min = 1, max = 4000, message = "Pertanyaan harus 1 sampai 4000 karakter"))]
    pub message: String,
    #[serde(default)]
    #[validate(length(max = 20, message = "Riwayat percakapan maksimal 20 pesan"), nested)]
    pub history: Vec<CoachTurnDTO>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CoachReplyDTO {
    pub reply: String,
    /// true when the AI call failed and `reply` is the static apology
    pub fallback: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct PricingStrategyRequestDTO {
    #[validate(length(min = 1, max = 100, message = "Nama produk wajib diisi"))]
    pub product_name: String,
    #[validate(range(min = 0.0, message = "HPP tidak boleh negatif"))]
    pub hpp_per_unit: f64,
    #[validate(range(min = 0.0, message = "Harga pesaing tidak boleh negatif"))]
    pub competitor_price: Option<f64>,
    #[validate(length(max = 200))]
    pub target_market: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CaptionRequestDTO {
    #[validate(length(min = 1, max = 100, message = "Nama produk wajib diisi"))]
    pub product_name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(length(max = 50))]
    pub platform: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CaptionDTO {
    pub caption: String,
}
