//! Calculators - Pure pricing arithmetic
//!
//! Every function validates its input and returns a [`CalculatorError`] instead of
//! producing NaN or negative money amounts.

pub mod ads;
pub mod hpp;
pub mod loan;
pub mod price;
pub mod profit;

pub use ads::{AdsInput, AdsResult, simulate_ads};
pub use hpp::{HppBreakdown, HppInput, compute_hpp, suggested_price};
pub use loan::{AmortizationRow, LoanInput, LoanResult, amortize, monthly_installment};
pub use price::{PriceInput, PriceResult, margin_from_price, markup_from_price, price_from_cost};
pub use profit::{ProfitInput, ProfitResult, simulate_profit};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculatorError {
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: f64 },
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<f64, CalculatorError> {
    if !value.is_finite() {
        return Err(CalculatorError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(CalculatorError::Negative { field });
    }
    Ok(value)
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<f64, CalculatorError> {
    if non_negative(field, value)? == 0.0 {
        return Err(CalculatorError::NotPositive { field });
    }
    Ok(value)
}

/// Percentage of `part` over `whole`, zero when `whole` is zero
pub(crate) fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}
