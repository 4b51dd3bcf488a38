//! Admin note database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the admin_notes table
#[derive(Debug, Clone, FromRow)]
pub struct AdminNoteModel {
    pub id: Uuid,
    pub product_registration_id: Uuid,
    pub admin_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
