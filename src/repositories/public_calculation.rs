//! PublicCalculationRepository - Community feed entries

use super::{Delete, Read};
use crate::entities::{Calculation, PublicCalculation};
use chrono::{DateTime, Utc};
use sqlx::{Error, FromRow, SqlitePool};
use tracing::{debug, instrument};

/// Feed row joined with the number of comments it has
#[derive(Debug, Clone, FromRow)]
pub struct FeedRow {
    #[sqlx(flatten)]
    pub entry: PublicCalculation,
    pub comment_count: i64,
}

pub struct PublicCalculationRepository {
    connection_pool: SqlitePool,
}

impl PublicCalculationRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Publishes a snapshot of `calculation`. Publishing the same calculation again
    /// refreshes the snapshot and caption, the entry keeps its id.
    #[instrument(skip(self, calculation, caption), fields(calculation_id = %calculation.calculation_id))]
    pub async fn publish(
        &self,
        calculation: &Calculation,
        author_name: &str,
        caption: Option<&str>,
    ) -> Result<PublicCalculation, Error> {
        sqlx::query_as::<_, PublicCalculation>(
            r#"
            INSERT INTO public_calculations (
                calculation_id, user_id, author_name, product_name, materials, hpp, hpp_per_unit,
                suggested_price_per_unit, margin_percent, units_produced, caption, published_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(calculation_id) DO UPDATE SET
                author_name = excluded.author_name,
                product_name = excluded.product_name,
                materials = excluded.materials,
                hpp = excluded.hpp,
                hpp_per_unit = excluded.hpp_per_unit,
                suggested_price_per_unit = excluded.suggested_price_per_unit,
                margin_percent = excluded.margin_percent,
                units_produced = excluded.units_produced,
                caption = excluded.caption
            RETURNING public_id, calculation_id, user_id, author_name, product_name, materials,
                      hpp, hpp_per_unit, suggested_price_per_unit, margin_percent,
                      units_produced, caption, published_at
            "#,
        )
        .bind(calculation.calculation_id)
        .bind(calculation.user_id)
        .bind(author_name)
        .bind(&calculation.product_name)
        .bind(&calculation.materials)
        .bind(calculation.hpp)
        .bind(calculation.hpp_per_unit)
        .bind(calculation.suggested_price_per_unit)
        .bind(calculation.margin_percent)
        .bind(calculation.units_produced)
        .bind(caption)
        .bind(Utc::now())
        .fetch_one(&self.connection_pool)
        .await
    }

    /// Keeps an already published snapshot in line with its edited calculation.
    /// No-op when the calculation was never published.
    pub async fn sync_with_calculation(&self, calculation: &Calculation) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE public_calculations SET
                product_name = ?, materials = ?, hpp = ?, hpp_per_unit = ?,
                suggested_price_per_unit = ?, margin_percent = ?, units_produced = ?
            WHERE calculation_id = ?
            "#,
        )
        .bind(&calculation.product_name)
        .bind(&calculation.materials)
        .bind(calculation.hpp)
        .bind(calculation.hpp_per_unit)
        .bind(calculation.suggested_price_per_unit)
        .bind(calculation.margin_percent)
        .bind(calculation.units_produced)
        .bind(calculation.calculation_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Feed page, newest first. `before` is an exclusive cursor on `published_at`.
    #[instrument(skip(self))]
    pub async fn find_page(
        &self,
        before: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<FeedRow>, Error> {
        let rows = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT p.public_id, p.calculation_id, p.user_id, p.author_name, p.product_name,
                   p.materials, p.hpp, p.hpp_per_unit, p.suggested_price_per_unit,
                   p.margin_percent, p.units_produced, p.caption, p.published_at,
                   (SELECT COUNT(*) FROM comments c WHERE c.public_id = p.public_id) AS comment_count
            FROM public_calculations p
            WHERE (? IS NULL OR p.published_at < ?)
            ORDER BY p.published_at DESC, p.public_id DESC
            LIMIT ?
            "#,
        )
        .bind(before)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Loaded {} feed entries", rows.len());
        Ok(rows)
    }

    pub async fn find_by_calculation(
        &self,
        calculation_id: &i64,
    ) -> Result<Option<PublicCalculation>, Error> {
        sqlx::query_as::<_, PublicCalculation>(
            r#"
            SELECT public_id, calculation_id, user_id, author_name, product_name, materials,
                   hpp, hpp_per_unit, suggested_price_per_unit, margin_percent,
                   units_produced, caption, published_at
            FROM public_calculations
            WHERE calculation_id = ?
            "#,
        )
        .bind(calculation_id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Author names are denormalized onto feed entries, refreshed when a profile changes
    pub async fn rename_author(&self, user_id: &i64, author_name: &str) -> Result<u64, Error> {
        let result = sqlx::query("UPDATE public_calculations SET author_name = ? WHERE user_id = ?")
            .bind(author_name)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM public_calculations")
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl Read<PublicCalculation, i64> for PublicCalculationRepository {
    async fn read(&self, id: &i64) -> Result<Option<PublicCalculation>, Error> {
        sqlx::query_as::<_, PublicCalculation>(
            r#"
            SELECT public_id, calculation_id, user_id, author_name, product_name, materials,
                   hpp, hpp_per_unit, suggested_price_per_unit, margin_percent,
                   units_produced, caption, published_at
            FROM public_calculations
            WHERE public_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Delete<i64> for PublicCalculationRepository {
    /// Comments of the entry cascade
    async fn delete(&self, id: &i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM public_calculations WHERE public_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
