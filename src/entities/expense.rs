//! Expense entity

use super::enums::ExpenseCategory;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Expense {
    pub expense_id: i64,
    pub user_id: i64,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
