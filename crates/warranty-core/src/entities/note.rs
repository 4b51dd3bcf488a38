//! Admin note entity - append-only audit trail on a registration

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Note left by an admin on a product registration. Append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminNote {
    pub id: Uuid,
    pub registration_id: Uuid,
    pub admin_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
