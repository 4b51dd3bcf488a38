//! Product registration entity and its review state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review status of a product registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    PendingReview,
    Approved,
    Rejected,
    InfoRequested,
}

impl RegistrationStatus {
    /// Database representation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingReview => "PENDING_REVIEW",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::InfoRequested => "INFO_REQUESTED",
        }
    }

    /// Parse from the database representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING_REVIEW" => Some(Self::PendingReview),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            "INFO_REQUESTED" => Some(Self::InfoRequested),
            _ => None,
        }
    }

    /// Whether a review decision may move a registration from `self` to
    /// `target`. Approved and rejected registrations are final; a
    /// registration waiting on more information may be decided directly.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        match self {
            Self::PendingReview => matches!(
                target,
                Self::Approved | Self::Rejected | Self::InfoRequested
            ),
            Self::InfoRequested => matches!(
                target,
                Self::PendingReview | Self::Approved | Self::Rejected
            ),
            Self::Approved | Self::Rejected => false,
        }
    }

    /// Whether the customer may still attach photos in this status
    #[must_use]
    pub fn accepts_photos(self) -> bool {
        matches!(self, Self::PendingReview | Self::InfoRequested)
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of an uploaded evidence file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhotoKind {
    Label,
    Invoice,
    Additional,
}

impl PhotoKind {
    /// Database representation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Label => "LABEL",
            Self::Invoice => "INVOICE",
            Self::Additional => "ADDITIONAL",
        }
    }

    /// Parse from the database representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LABEL" => Some(Self::Label),
            "INVOICE" => Some(Self::Invoice),
            "ADDITIONAL" => Some(Self::Additional),
            _ => None,
        }
    }

    /// Kind assigned by upload position: first file is the label photo,
    /// second the invoice, the rest supplementary.
    #[must_use]
    pub fn for_upload_index(index: usize) -> Self {
        match index {
            0 => Self::Label,
            1 => Self::Invoice,
            _ => Self::Additional,
        }
    }
}

/// Product registration. Created on submission, reviewed by an admin,
/// never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRegistration {
    pub id: Uuid,
    pub user_id: Uuid,
    pub model_id: Uuid,
    pub source_id: Uuid,
    pub purchase_date: DateTime<Utc>,
    pub received_undamaged: bool,
    pub info_accurate: bool,
    pub status: RegistrationStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Evidence photo attached to a registration. Immutable once created; the
/// content hash feeds the duplicate-evidence report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPhoto {
    pub id: Uuid,
    pub registration_id: Uuid,
    pub kind: PhotoKind,
    pub original_filename: String,
    pub storage_path: String,
    pub mime_type: String,
    pub file_size: i64,
    pub sha256_hash: String,
    pub created_at: DateTime<Utc>,
}
