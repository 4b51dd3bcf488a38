//! Catalog database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the mattress_models table
#[derive(Debug, Clone, FromRow)]
pub struct MattressModelModel {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub warranty_months: i32,
    pub released_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Database model for the purchase_sources table
#[derive(Debug, Clone, FromRow)]
pub struct PurchaseSourceModel {
    pub id: Uuid,
    pub name: String,
    pub source_type: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
