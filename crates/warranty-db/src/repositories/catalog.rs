//! PostgreSQL implementation of CatalogRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use warranty_core::traits::{CatalogRepository, RepoResult};
use warranty_core::{MattressModel, PurchaseSource};

use crate::models::{MattressModelModel, PurchaseSourceModel};

use super::error::map_db_error;

const MODEL_COLUMNS: &str =
    "id, name, slug, description, warranty_months, released_at, is_active, created_at";
const SOURCE_COLUMNS: &str = "id, name, source_type, is_active, created_at";

/// PostgreSQL implementation of CatalogRepository
#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    /// Create a new PgCatalogRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    #[instrument(skip(self))]
    async fn find_model(&self, id: Uuid) -> RepoResult<Option<MattressModel>> {
        let result = sqlx::query_as::<_, MattressModelModel>(&format!(
            "SELECT {MODEL_COLUMNS} FROM mattress_models WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(MattressModel::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_source(&self, id: Uuid) -> RepoResult<Option<PurchaseSource>> {
        let result = sqlx::query_as::<_, PurchaseSourceModel>(&format!(
            "SELECT {SOURCE_COLUMNS} FROM purchase_sources WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(PurchaseSource::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_active_models(&self) -> RepoResult<Vec<MattressModel>> {
        let rows = sqlx::query_as::<_, MattressModelModel>(&format!(
            "SELECT {MODEL_COLUMNS} FROM mattress_models WHERE is_active ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(MattressModel::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn list_active_sources(&self) -> RepoResult<Vec<PurchaseSource>> {
        let rows = sqlx::query_as::<_, PurchaseSourceModel>(&format!(
            "SELECT {SOURCE_COLUMNS} FROM purchase_sources WHERE is_active ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(PurchaseSource::try_from).collect()
    }
}
