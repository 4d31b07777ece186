//! Expense services - Expense tracker, summary and CSV export

use crate::core::{AppError, AppState};
use crate::dtos::{
    CategoryTotalDTO, CreateExpenseDTO, ExpenseDTO, ExpenseFormDTO, ExpenseQuery,
    ExpenseSummaryDTO,
};
use crate::entities::{Expense, User};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

async fn owned_expense(
    state: &AppState,
    expense_id: i64,
    user_id: i64,
) -> Result<Expense, AppError> {
    match state.expense.read(&expense_id).await? {
        Some(expense) if expense.user_id == user_id => Ok(expense),
        _ => Err(AppError::not_found("Pengeluaran tidak ditemukan")),
    }
}

pub(crate) fn check_range(filter: &ExpenseQuery) -> Result<(), AppError> {
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(AppError::bad_request("Tanggal awal harus sebelum tanggal akhir"));
        }
    }
    Ok(())
}

fn normalize(mut form: ExpenseFormDTO) -> ExpenseFormDTO {
    form.description = form
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    form
}

/// Summary over `filter`, shared with the AI expense insight
pub(crate) async fn build_summary(
    state: &AppState,
    user_id: i64,
    filter: &ExpenseQuery,
) -> Result<ExpenseSummaryDTO, AppError> {
    let rows = state.expense.totals_by_category(&user_id, filter).await?;

    let by_category: Vec<CategoryTotalDTO> = rows
        .into_iter()
        .map(|row| CategoryTotalDTO {
            category: row.category,
            label: row.category.label().to_string(),
            total: row.total,
            count: row.count,
        })
        .collect();

    Ok(ExpenseSummaryDTO {
        from: filter.from,
        to: filter.to,
        total: by_category.iter().map(|row| row.total).sum(),
        count: by_category.iter().map(|row| row.count).sum(),
        by_category,
    })
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(filter): Query<ExpenseQuery>,
) -> Result<Json<Vec<ExpenseDTO>>, AppError> {
    check_range(&filter)?;
    let expenses = state
        .expense
        .find_filtered(&current_user.user_id, &filter)
        .await?;
    Ok(Json(expenses.into_iter().map(ExpenseDTO::from).collect()))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<ExpenseFormDTO>,
) -> Result<impl IntoResponse, AppError> {
    body.validate()?;
    let created = state
        .expense
        .create(&CreateExpenseDTO {
            user_id: current_user.user_id,
            form: normalize(body),
        })
        .await?;
    info!("Expense {} recorded", created.expense_id);
    Ok((StatusCode::CREATED, Json(ExpenseDTO::from(created))))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(expense_id): Path<i64>,
    Json(body): Json<ExpenseFormDTO>,
) -> Result<Json<ExpenseDTO>, AppError> {
    body.validate()?;
    owned_expense(&state, expense_id, current_user.user_id).await?;
    let updated = state.expense.update(&expense_id, &normalize(body)).await?;
    Ok(Json(ExpenseDTO::from(updated)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(expense_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    owned_expense(&state, expense_id, current_user.user_id).await?;
    state.expense.delete(&expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn expense_summary(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(filter): Query<ExpenseQuery>,
) -> Result<Json<ExpenseSummaryDTO>, AppError> {
    check_range(&filter)?;
    Ok(Json(
        build_summary(&state, current_user.user_id, &filter).await?,
    ))
}

/// Quotes a CSV field when it contains a separator, a quote or a line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub(crate) fn expenses_to_csv(expenses: &[Expense]) -> String {
    let mut csv = String::from("tanggal,kategori,jumlah,keterangan\n");
    for expense in expenses {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            expense.expense_date,
            csv_field(expense.category.label()),
            expense.amount,
            csv_field(expense.description.as_deref().unwrap_or("")),
        ));
    }
    csv
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn export_expenses(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Query(filter): Query<ExpenseQuery>,
) -> Result<impl IntoResponse, AppError> {
    check_range(&filter)?;
    let expenses = state
        .expense
        .find_filtered(&current_user.user_id, &filter)
        .await?;
    if expenses.is_empty() {
        warn!("Exporting an empty expense list");
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"pengeluaran.csv\"",
            ),
        ],
        expenses_to_csv(&expenses),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ExpenseCategory;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_csv_escapes_descriptions() {
        let expense = Expense {
            expense_id: 1,
            user_id: 1,
            amount: 125000.0,
            category: ExpenseCategory::BahanBaku,
            description: Some("Tepung, gula \"premium\"".to_string()),
            expense_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            created_at: Utc::now(),
        };

        let csv = expenses_to_csv(&[expense]);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("tanggal,kategori,jumlah,keterangan"));
        assert_eq!(
            lines.next(),
            Some("2025-03-01,Bahan Baku,125000,\"Tepung, gula \"\"premium\"\"\"")
        );
    }
}
