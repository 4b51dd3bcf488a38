//! PostgreSQL implementation of WarrantyRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use warranty_core::traits::{RepoResult, WarrantyRepository, WarrantySummary};
use warranty_core::{DomainError, Warranty, WarrantyStatus};

use crate::models::WarrantyModel;

use super::error::map_db_error;

const WARRANTY_COLUMNS: &str =
    "id, product_registration_id, status, start_date, end_date, activated_at, created_at";

/// Warranty row joined with model facts for the detail view
#[derive(Debug, FromRow)]
struct WarrantySummaryRow {
    #[sqlx(flatten)]
    warranty: WarrantyModel,
    model_name: String,
    warranty_months: i32,
}

/// PostgreSQL implementation of WarrantyRepository
#[derive(Clone)]
pub struct PgWarrantyRepository {
    pool: PgPool,
}

impl PgWarrantyRepository {
    /// Create a new PgWarrantyRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WarrantyRepository for PgWarrantyRepository {
    #[instrument(skip(self))]
    async fn find_by_registration(&self, registration_id: Uuid) -> RepoResult<Option<Warranty>> {
        let result = sqlx::query_as::<_, WarrantyModel>(&format!(
            "SELECT {WARRANTY_COLUMNS} FROM warranties WHERE product_registration_id = $1"
        ))
        .bind(registration_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Warranty::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn summary_for_registration(
        &self,
        registration_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<Option<WarrantySummary>> {
        let result = sqlx::query_as::<_, WarrantySummaryRow>(
            r"
            SELECT w.id, w.product_registration_id, w.status, w.start_date, w.end_date,
                   w.activated_at, w.created_at,
                   m.name AS model_name, m.warranty_months
            FROM warranties w
            JOIN product_registrations r ON r.id = w.product_registration_id
            JOIN mattress_models m ON m.id = r.mattress_model_id
            WHERE w.product_registration_id = $1 AND r.user_id = $2
            ",
        )
        .bind(registration_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result
            .map(|row| {
                let warranty_months = u32::try_from(row.warranty_months).map_err(|_| {
                    DomainError::DatabaseError(format!(
                        "Negative warranty_months in row: {}",
                        row.warranty_months
                    ))
                })?;
                Ok(WarrantySummary {
                    warranty: Warranty::try_from(row.warranty)?,
                    model_name: row.model_name,
                    warranty_months,
                })
            })
            .transpose()
    }

    #[instrument(skip(self))]
    async fn expire_overdue(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            "UPDATE warranties SET status = $1 WHERE status = $2 AND end_date < $3",
        )
        .bind(WarrantyStatus::Expired.as_str())
        .bind(WarrantyStatus::Active.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn count_active(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warranties WHERE status = $1")
            .bind(WarrantyStatus::Active.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}
