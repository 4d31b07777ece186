//! Loan - Annuity installment and amortization schedule

use super::{CalculatorError, non_negative, positive};
use serde::{Deserialize, Serialize};

pub const MAX_TERM_MONTHS: u32 = 600;
pub const MAX_ANNUAL_RATE_PERCENT: f64 = 1000.0;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoanInput {
    pub principal: f64,
    /// yearly interest in percent, e.g. 12.0 for 12%
    pub annual_rate_percent: f64,
    pub term_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub installment: f64,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub remaining_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    pub monthly_installment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub schedule: Vec<AmortizationRow>,
}

/// M = P * r * (1+r)^n / ((1+r)^n - 1), r = annual / 12 / 100. With r = 0, M = P / n.
pub fn monthly_installment(
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
) -> Result<f64, CalculatorError> {
    let principal = positive("principal", principal)?;
    let annual = non_negative("annual_rate_percent", annual_rate_percent)?;
    if annual > MAX_ANNUAL_RATE_PERCENT {
        return Err(CalculatorError::TooLarge {
            field: "annual_rate_percent",
            max: MAX_ANNUAL_RATE_PERCENT,
        });
    }
    if term_months == 0 {
        return Err(CalculatorError::NotPositive {
            field: "term_months",
        });
    }
    if term_months > MAX_TERM_MONTHS {
        return Err(CalculatorError::TooLarge {
            field: "term_months",
            max: MAX_TERM_MONTHS as f64,
        });
    }

    let n = term_months as f64;
    let r = annual / 12.0 / 100.0;
    if r == 0.0 {
        return Ok(principal / n);
    }
    let growth = (1.0 + r).powf(n);
    let installment = principal * r * growth / (growth - 1.0);
    if !installment.is_finite() {
        return Err(CalculatorError::NotFinite {
            field: "monthly_installment",
        });
    }
    Ok(installment)
}

pub fn amortize(input: &LoanInput) -> Result<LoanResult, CalculatorError> {
    let installment =
        monthly_installment(input.principal, input.annual_rate_percent, input.term_months)?;
    let r = input.annual_rate_percent / 12.0 / 100.0;

    let mut balance = input.principal;
    let mut schedule = Vec::with_capacity(input.term_months as usize);
    for month in 1..=input.term_months {
        let interest_paid = balance * r;
        let mut principal_paid = installment - interest_paid;
        // absorb floating point drift in the final row
        if month == input.term_months {
            principal_paid = balance;
        }
        balance = (balance - principal_paid).max(0.0);
        schedule.push(AmortizationRow {
            month,
            installment: principal_paid + interest_paid,
            principal_paid,
            interest_paid,
            remaining_balance: balance,
        });
    }

    let total_payment: f64 = schedule.iter().map(|row| row.installment).sum();
    if !total_payment.is_finite() {
        return Err(CalculatorError::NotFinite {
            field: "total_payment",
        });
    }
    Ok(LoanResult {
        monthly_installment: installment,
        total_payment,
        total_interest: total_payment - input.principal,
        schedule,
    })
}
