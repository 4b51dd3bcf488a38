//! Catalog handlers
//!
//! Public listings of active mattress models and purchase sources.

use axum::{extract::State, Json};
use warranty_service::{CatalogService, ModelResponse, SourceResponse};

use crate::response::ApiResult;
use crate::state::AppState;

/// List active mattress models
///
/// GET /catalog/models
pub async fn list_models(State(state): State<AppState>) -> ApiResult<Json<Vec<ModelResponse>>> {
    let service = CatalogService::new(state.service_context());
    Ok(Json(service.list_models().await?))
}

/// List active purchase sources
///
/// GET /catalog/sources
pub async fn list_sources(State(state): State<AppState>) -> ApiResult<Json<Vec<SourceResponse>>> {
    let service = CatalogService::new(state.service_context());
    Ok(Json(service.list_sources().await?))
}
