//! CalculationRepository - Saved HPP calculations

use super::{Create, Delete, Read, Update};
use crate::dtos::CalculationRecordDTO;
use crate::entities::Calculation;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{Error, SqlitePool};
use tracing::{debug, instrument};

pub struct CalculationRepository {
    connection_pool: SqlitePool,
}

impl CalculationRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// All calculations of a user, newest first
    #[instrument(skip(self))]
    pub async fn find_many_by_user(&self, user_id: &i64) -> Result<Vec<Calculation>, Error> {
        let calculations = sqlx::query_as::<_, Calculation>(
            r#"
            SELECT calculation_id, user_id, product_name, materials, labor_cost, overhead_cost,
                   packaging_cost, margin_percent, units_produced, hpp, hpp_per_unit,
                   suggested_price, suggested_price_per_unit, created_at, updated_at
            FROM calculations
            WHERE user_id = ?
            ORDER BY created_at DESC, calculation_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await?;

        debug!("Found {} calculations", calculations.len());
        Ok(calculations)
    }

    /// Latest calculations across all users (admin dashboard)
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Calculation>, Error> {
        sqlx::query_as::<_, Calculation>(
            r#"
            SELECT calculation_id, user_id, product_name, materials, labor_cost, overhead_cost,
                   packaging_cost, margin_percent, units_produced, hpp, hpp_per_unit,
                   suggested_price, suggested_price_per_unit, created_at, updated_at
            FROM calculations
            ORDER BY created_at DESC, calculation_id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn count(&self) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM calculations")
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl Create<Calculation, CalculationRecordDTO> for CalculationRepository {
    #[instrument(skip(self, data), fields(user_id = %data.user_id, product = %data.product_name))]
    async fn create(&self, data: &CalculationRecordDTO) -> Result<Calculation, Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Calculation>(
            r#"
            INSERT INTO calculations (
                user_id, product_name, materials, labor_cost, overhead_cost, packaging_cost,
                margin_percent, units_produced, hpp, hpp_per_unit, suggested_price,
                suggested_price_per_unit, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING calculation_id, user_id, product_name, materials, labor_cost, overhead_cost,
                      packaging_cost, margin_percent, units_produced, hpp, hpp_per_unit,
                      suggested_price, suggested_price_per_unit, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(&data.product_name)
        .bind(Json(&data.materials))
        .bind(data.breakdown.labor_cost)
        .bind(data.breakdown.overhead_cost)
        .bind(data.breakdown.packaging_cost)
        .bind(data.margin_percent)
        .bind(data.units_produced)
        .bind(data.breakdown.hpp)
        .bind(data.breakdown.hpp_per_unit)
        .bind(data.breakdown.suggested_price)
        .bind(data.breakdown.suggested_price_per_unit)
        .bind(now)
        .bind(now)
        .fetch_one(&self.connection_pool)
        .await
    }
}

impl Read<Calculation, i64> for CalculationRepository {
    async fn read(&self, id: &i64) -> Result<Option<Calculation>, Error> {
        sqlx::query_as::<_, Calculation>(
            r#"
            SELECT calculation_id, user_id, product_name, materials, labor_cost, overhead_cost,
                   packaging_cost, margin_percent, units_produced, hpp, hpp_per_unit,
                   suggested_price, suggested_price_per_unit, created_at, updated_at
            FROM calculations
            WHERE calculation_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<Calculation, CalculationRecordDTO, i64> for CalculationRepository {
    #[instrument(skip(self, data))]
    async fn update(&self, id: &i64, data: &CalculationRecordDTO) -> Result<Calculation, Error> {
        sqlx::query_as::<_, Calculation>(
            r#"
            UPDATE calculations SET
                product_name = ?, materials = ?, labor_cost = ?, overhead_cost = ?,
                packaging_cost = ?, margin_percent = ?, units_produced = ?, hpp = ?,
                hpp_per_unit = ?, suggested_price = ?, suggested_price_per_unit = ?,
                updated_at = ?
            WHERE calculation_id = ? AND user_id = ?
            RETURNING calculation_id, user_id, product_name, materials, labor_cost, overhead_cost,
                      packaging_cost, margin_percent, units_produced, hpp, hpp_per_unit,
                      suggested_price, suggested_price_per_unit, created_at, updated_at
            "#,
        )
        .bind(&data.product_name)
        .bind(Json(&data.materials))
        .bind(data.breakdown.labor_cost)
        .bind(data.breakdown.overhead_cost)
        .bind(data.breakdown.packaging_cost)
        .bind(data.margin_percent)
        .bind(data.units_produced)
        .bind(data.breakdown.hpp)
        .bind(data.breakdown.hpp_per_unit)
        .bind(data.breakdown.suggested_price)
        .bind(data.breakdown.suggested_price_per_unit)
        .bind(Utc::now())
        .bind(id)
        .bind(data.user_id)
        .fetch_optional(&self.connection_pool)
        .await?
        .ok_or(Error::RowNotFound)
    }
}

impl Delete<i64> for CalculationRepository {
    async fn delete(&self, id: &i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM calculations WHERE calculation_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
