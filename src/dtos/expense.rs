//! Expense DTOs

use crate::entities::{Expense, ExpenseCategory};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ExpenseDTO {
    pub expense_id: i64,
    pub amount: f64,
    pub category: ExpenseCategory,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<Expense> for ExpenseDTO {
    fn from(value: Expense) -> Self {
        Self {
            expense_id: value.expense_id,
            amount: value.amount,
            category: value.category,
            description: value.description,
            expense_date: value.expense_date,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct ExpenseFormDTO {
    #[validate(range(exclusive_min = 0.0, message = "Jumlah pengeluaran harus lebih dari 0"))]
    pub amount: f64,
    pub category: ExpenseCategory,
    #[validate(length(max = 300, message = "Keterangan maksimal 300 karakter"))]
    pub description: Option<String>,
    pub expense_date: NaiveDate,
}

/// Insert payload for the expenses table
#[derive(Debug, Clone)]
pub struct CreateExpenseDTO {
    pub user_id: i64,
    pub form: ExpenseFormDTO,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategoryTotalDTO {
    pub category: ExpenseCategory,
    pub label: String,
    pub total: f64,
    pub count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExpenseSummaryDTO {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub total: f64,
    pub count: i64,
    pub by_category: Vec<CategoryTotalDTO>,
}
