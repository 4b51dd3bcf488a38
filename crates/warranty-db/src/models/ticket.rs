//! Support ticket database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the support_tickets table
#[derive(Debug, Clone, FromRow)]
pub struct TicketModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub status: String,
    pub priority: String,
    pub tags: Vec<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for the ticket_messages table
#[derive(Debug, Clone, FromRow)]
pub struct TicketMessageModel {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub sender_type: String,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Database model for the ticket_attachments table
#[derive(Debug, Clone, FromRow)]
pub struct TicketAttachmentModel {
    pub id: Uuid,
    pub message_id: Uuid,
    pub original_filename: String,
    pub storage_path: String,
    pub mime_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

/// Columns selected for every ticket query
pub const TICKET_COLUMNS: &str =
    "id, user_id, subject, status, priority, tags, closed_at, created_at, updated_at";
