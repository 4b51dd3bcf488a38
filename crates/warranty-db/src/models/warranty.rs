//! Warranty database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the warranties table
#[derive(Debug, Clone, FromRow)]
pub struct WarrantyModel {
    pub id: Uuid,
    pub product_registration_id: Uuid,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
