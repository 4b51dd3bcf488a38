//! Product registration database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the product_registrations table
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mattress_model_id: Uuid,
    pub purchase_source_id: Uuid,
    pub purchase_date: DateTime<Utc>,
    pub received_undamaged: bool,
    pub info_accurate: bool,
    pub registration_status: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for the registration_photos table
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationPhotoModel {
    pub id: Uuid,
    pub product_registration_id: Uuid,
    pub photo_type: String,
    pub original_filename: String,
    pub storage_path: String,
    pub mime_type: String,
    pub file_size: i64,
    pub sha256_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Columns selected for every registration query
pub const REGISTRATION_COLUMNS: &str =
    "id, user_id, mattress_model_id, purchase_source_id, purchase_date, received_undamaged, \
     info_accurate, registration_status, rejection_reason, created_at, updated_at";
