//! Support ticket entities and the message-driven status machine

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Database representation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
            Self::Closed => "CLOSED",
        }
    }

    /// Parse from the database representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(Self::Open),
            "IN_PROGRESS" => Some(Self::InProgress),
            "RESOLVED" => Some(Self::Resolved),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Statuses that stamp the closed timestamp when set by an admin
    #[must_use]
    pub fn stamps_closed_at(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    /// Database representation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }

    /// Parse from the database representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "URGENT" => Some(Self::Urgent),
            _ => None,
        }
    }
}

impl Default for TicketPriority {
    fn default() -> Self {
        Self::Medium
    }
}

/// Who sent a ticket message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderKind {
    Customer,
    Admin,
}

impl SenderKind {
    /// Database representation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }

    /// Parse from the database representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Self::Customer),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Outcome of gating a customer reply against the ticket state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerReplyGate {
    /// Reply may be appended as-is
    Allowed,
    /// Reply may be appended, and the resolved ticket reopens
    Reopens,
    /// Ticket is closed, no replies accepted
    TicketClosed,
    /// Ticket was resolved longer ago than the grace window allows
    GraceWindowExpired,
}

impl CustomerReplyGate {
    #[inline]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed | Self::Reopens)
    }
}

/// Support ticket owned by a customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportTicket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub tags: Vec<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupportTicket {
    /// Gate a customer reply. Closed tickets never accept replies; resolved
    /// tickets accept them (and reopen) only while the closed timestamp is
    /// within the grace window.
    #[must_use]
    pub fn customer_reply_gate(&self, now: DateTime<Utc>, grace_days: i64) -> CustomerReplyGate {
        match self.status {
            TicketStatus::Closed => CustomerReplyGate::TicketClosed,
            TicketStatus::Resolved => {
                if let Some(closed_at) = self.closed_at {
                    if closed_at < now - Duration::days(grace_days) {
                        return CustomerReplyGate::GraceWindowExpired;
                    }
                }
                CustomerReplyGate::Reopens
            }
            TicketStatus::Open | TicketStatus::InProgress => CustomerReplyGate::Allowed,
        }
    }
}

/// Message within a ticket thread, ordered by creation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketMessage {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub sender: SenderKind,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// File attached to a ticket message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketAttachment {
    pub id: Uuid,
    pub message_id: Uuid,
    pub original_filename: String,
    pub storage_path: String,
    pub mime_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}
