//! Catalog service
//!
//! Read-only listings of the product catalog.

use tracing::instrument;

use crate::dto::{ModelResponse, SourceResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Catalog service
pub struct CatalogService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CatalogService<'a> {
    /// Create a new CatalogService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Active mattress models, name-ordered
    #[instrument(skip(self))]
    pub async fn list_models(&self) -> ServiceResult<Vec<ModelResponse>> {
        let models = self.ctx.catalog_repo().list_active_models().await?;
        Ok(models.iter().map(ModelResponse::from).collect())
    }

    /// Active purchase sources, name-ordered
    #[instrument(skip(self))]
    pub async fn list_sources(&self) -> ServiceResult<Vec<SourceResponse>> {
        let sources = self.ctx.catalog_repo().list_active_sources().await?;
        Ok(sources.iter().map(SourceResponse::from).collect())
    }
}
