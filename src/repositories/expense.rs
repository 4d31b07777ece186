//! ExpenseRepository - Expense tracker

use super::{Create, Delete, Read, Update};
use crate::dtos::{CreateExpenseDTO, ExpenseFormDTO, ExpenseQuery};
use crate::entities::{Expense, ExpenseCategory};
use chrono::Utc;
use sqlx::{Error, FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, instrument};

/// One `GROUP BY category` row of the summary query
#[derive(Debug, Clone, FromRow)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: f64,
    pub count: i64,
}

pub struct ExpenseRepository {
    connection_pool: SqlitePool,
}

/// Appends the user and optional date/category filters, dates are inclusive
fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, user_id: i64, filter: &ExpenseQuery) {
    builder.push(" WHERE user_id = ").push_bind(user_id);
    if let Some(from) = filter.from {
        builder.push(" AND expense_date >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND expense_date <= ").push_bind(to);
    }
    if let Some(category) = filter.category {
        builder.push(" AND category = ").push_bind(category);
    }
}

impl ExpenseRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Expenses of a user matching `filter`, most recent date first
    #[instrument(skip(self))]
    pub async fn find_filtered(
        &self,
        user_id: &i64,
        filter: &ExpenseQuery,
    ) -> Result<Vec<Expense>, Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT expense_id, user_id, amount, category, description, expense_date, created_at \
             FROM expenses",
        );
        push_filters(&mut builder, *user_id, filter);
        builder.push(" ORDER BY expense_date DESC, expense_id DESC");

        let expenses = builder
            .build_query_as::<Expense>()
            .fetch_all(&self.connection_pool)
            .await?;

        debug!("Found {} expenses", expenses.len());
        Ok(expenses)
    }

    /// Totals per category over the same filter as [`Self::find_filtered`]
    #[instrument(skip(self))]
    pub async fn totals_by_category(
        &self,
        user_id: &i64,
        filter: &ExpenseQuery,
    ) -> Result<Vec<CategoryTotal>, Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT category, SUM(amount) AS total, COUNT(*) AS count FROM expenses",
        );
        push_filters(&mut builder, *user_id, filter);
        builder.push(" GROUP BY category ORDER BY total DESC");

        builder
            .build_query_as::<CategoryTotal>()
            .fetch_all(&self.connection_pool)
            .await
    }

    pub async fn total_amount(&self) -> Result<f64, Error> {
        sqlx::query_scalar::<_, f64>("SELECT COALESCE(SUM(amount), 0.0) FROM expenses")
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl Create<Expense, CreateExpenseDTO> for ExpenseRepository {
    #[instrument(skip(self, data), fields(user_id = %data.user_id))]
    async fn create(&self, data: &CreateExpenseDTO) -> Result<Expense, Error> {
        sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (user_id, amount, category, description, expense_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING expense_id, user_id, amount, category, description, expense_date, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.form.amount)
        .bind(data.form.category)
        .bind(&data.form.description)
        .bind(data.form.expense_date)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Expense, i64> for ExpenseRepository {
    async fn read(&self, id: &i64) -> Result<Option<Expense>, Error> {
        sqlx::query_as::<_, Expense>(
            r#"
            SELECT expense_id, user_id, amount, category, description, expense_date, created_at
            FROM expenses
            WHERE expense_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<Expense, ExpenseFormDTO, i64> for ExpenseRepository {
    async fn update(&self, id: &i64, data: &ExpenseFormDTO) -> Result<Expense, Error> {
        sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses SET amount = ?, category = ?, description = ?, expense_date = ?
            WHERE expense_id = ?
            RETURNING expense_id, user_id, amount, category, description, expense_date, created_at
            "#,
        )
        .bind(data.amount)
        .bind(data.category)
        .bind(&data.description)
        .bind(data.expense_date)
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }
}

impl Delete<i64> for ExpenseRepository {
    async fn delete(&self, id: &i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE expense_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
