//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output. Warranty
//! views report the *effective* status and remaining days computed at
//! response-build time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use warranty_core::traits::{
    CustomerOverview, CustomerSummary, DuplicateHashGroup, MonthlyRegistrationCount,
    RegistrationOverview, TicketOverview, TicketThreadEntry, WarrantySummary,
};
use warranty_core::{
    AdminNote, MattressModel, PhotoKind, PurchaseSource, RegistrationStatus, SenderKind,
    SourceType, SupportTicket, TicketPriority, TicketStatus, User, UserRole, Warranty,
    WarrantyStatus,
};

// ============================================================================
// Common Response Types
// ============================================================================

/// Paginated response with page/limit metadata
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// Pagination metadata
#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            data,
            meta: PageMeta {
                page,
                limit,
                total,
                total_pages,
            },
        }
    }
}

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Auth Responses
// ============================================================================

/// Current user response
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            phone: user.phone.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            is_verified: user.is_verified,
            created_at: user.created_at,
        }
    }
}

/// Successful registration; verification is still pending
#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    pub user_id: Uuid,
    pub message: String,
}

/// Authentication response body (the refresh token travels in a cookie)
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

impl AuthResponse {
    pub fn new(access_token: String, expires_in: i64, user: UserResponse) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

/// A full issued session: the response body plus the opaque refresh token
/// the handler turns into a cookie.
#[derive(Debug)]
pub struct IssuedSession {
    pub auth: AuthResponse,
    pub refresh_token: String,
}

// ============================================================================
// Catalog Responses
// ============================================================================

/// Mattress model catalog entry
#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub warranty_months: u32,
}

impl From<&MattressModel> for ModelResponse {
    fn from(model: &MattressModel) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            slug: model.slug.clone(),
            description: model.description.clone(),
            warranty_months: model.warranty_months,
        }
    }
}

/// Purchase source catalog entry
#[derive(Debug, Serialize)]
pub struct SourceResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
}

impl From<&PurchaseSource> for SourceResponse {
    fn from(source: &PurchaseSource) -> Self {
        Self {
            id: source.id,
            name: source.name.clone(),
            source_type: source.source_type,
        }
    }
}

// ============================================================================
// Registration Responses
// ============================================================================

/// Evidence photo
#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: PhotoKind,
    pub original_filename: String,
    pub sha256_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Warranty as embedded in registration views
#[derive(Debug, Serialize)]
pub struct WarrantyInfoResponse {
    pub status: WarrantyStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
}

impl WarrantyInfoResponse {
    fn at(warranty: &Warranty, now: DateTime<Utc>) -> Self {
        Self {
            status: warranty.effective_status(now),
            start_date: warranty.start_date,
            end_date: warranty.end_date,
            activated_at: warranty.activated_at,
        }
    }
}

/// Registration with its joined details
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub id: Uuid,
    pub status: RegistrationStatus,
    pub purchase_date: DateTime<Utc>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub user: UserResponse,
    pub model: ModelSummaryResponse,
    pub source: SourceSummaryResponse,
    pub warranty: Option<WarrantyInfoResponse>,
    pub photos: Vec<PhotoResponse>,
    pub note_count: i64,
}

/// Model facts embedded in a registration view
#[derive(Debug, Serialize)]
pub struct ModelSummaryResponse {
    pub name: String,
    pub slug: String,
    pub warranty_months: u32,
}

/// Source facts embedded in a registration view
#[derive(Debug, Serialize)]
pub struct SourceSummaryResponse {
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
}

impl From<RegistrationOverview> for RegistrationResponse {
    fn from(overview: RegistrationOverview) -> Self {
        let now = Utc::now();
        Self {
            id: overview.registration.id,
            status: overview.registration.status,
            purchase_date: overview.registration.purchase_date,
            rejection_reason: overview.registration.rejection_reason,
            created_at: overview.registration.created_at,
            user: UserResponse::from(&overview.user),
            model: ModelSummaryResponse {
                name: overview.model_name,
                slug: overview.model_slug,
                warranty_months: overview.warranty_months,
            },
            source: SourceSummaryResponse {
                name: overview.source_name,
                source_type: overview.source_type,
            },
            warranty: overview.warranty.map(|w| WarrantyInfoResponse::at(&w, now)),
            photos: overview
                .photos
                .into_iter()
                .map(|p| PhotoResponse {
                    id: p.id,
                    kind: p.kind,
                    original_filename: p.original_filename,
                    sha256_hash: p.sha256_hash,
                    created_at: p.created_at,
                })
                .collect(),
            note_count: overview.note_count,
        }
    }
}

/// Registration submission acknowledgement
#[derive(Debug, Serialize)]
pub struct RegistrationCreatedResponse {
    pub registration_id: Uuid,
    pub status: RegistrationStatus,
    pub message: String,
}

/// Admin registration detail with the audit trail
#[derive(Debug, Serialize)]
pub struct RegistrationDetailResponse {
    #[serde(flatten)]
    pub registration: RegistrationResponse,
    pub notes: Vec<NoteResponse>,
}

/// Audit note
#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<AdminNote> for NoteResponse {
    fn from(note: AdminNote) -> Self {
        Self {
            id: note.id,
            admin_id: note.admin_id,
            content: note.content,
            created_at: note.created_at,
        }
    }
}

// ============================================================================
// Warranty Responses
// ============================================================================

/// Warranty detail view with effective status and remaining coverage
#[derive(Debug, Serialize)]
pub struct WarrantyResponse {
    pub id: Uuid,
    pub status: WarrantyStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub model_name: String,
    pub warranty_months: u32,
    pub days_remaining: i64,
}

impl WarrantyResponse {
    /// Build the view as of `now`
    #[must_use]
    pub fn at(summary: WarrantySummary, now: DateTime<Utc>) -> Self {
        Self {
            id: summary.warranty.id,
            status: summary.warranty.effective_status(now),
            start_date: summary.warranty.start_date,
            end_date: summary.warranty.end_date,
            activated_at: summary.warranty.activated_at,
            model_name: summary.model_name,
            warranty_months: summary.warranty_months,
            days_remaining: summary.warranty.days_remaining(now),
        }
    }
}

// ============================================================================
// Ticket Responses
// ============================================================================

/// Ticket list entry
#[derive(Debug, Serialize)]
pub struct TicketSummaryResponse {
    pub id: Uuid,
    pub subject: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub tags: Vec<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserResponse,
    pub message_count: i64,
    pub last_message: Option<LastMessageResponse>,
}

/// Most recent message preview in a ticket list
#[derive(Debug, Serialize)]
pub struct LastMessageResponse {
    pub sender: SenderKind,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<TicketOverview> for TicketSummaryResponse {
    fn from(overview: TicketOverview) -> Self {
        Self {
            id: overview.ticket.id,
            subject: overview.ticket.subject,
            status: overview.ticket.status,
            priority: overview.ticket.priority,
            tags: overview.ticket.tags,
            closed_at: overview.ticket.closed_at,
            created_at: overview.ticket.created_at,
            updated_at: overview.ticket.updated_at,
            user: UserResponse::from(&overview.user),
            message_count: overview.message_count,
            last_message: overview.last_message.map(|m| LastMessageResponse {
                sender: m.sender,
                body: m.body,
                created_at: m.created_at,
            }),
        }
    }
}

/// Full ticket thread
#[derive(Debug, Serialize)]
pub struct TicketDetailResponse {
    pub id: Uuid,
    pub subject: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub tags: Vec<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<TicketMessageResponse>,
}

impl TicketDetailResponse {
    #[must_use]
    pub fn from_parts(ticket: SupportTicket, thread: Vec<TicketThreadEntry>) -> Self {
        Self {
            id: ticket.id,
            subject: ticket.subject,
            status: ticket.status,
            priority: ticket.priority,
            tags: ticket.tags,
            closed_at: ticket.closed_at,
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
            messages: thread.into_iter().map(TicketMessageResponse::from).collect(),
        }
    }
}

/// One message in a ticket thread
#[derive(Debug, Serialize)]
pub struct TicketMessageResponse {
    pub id: Uuid,
    pub sender: SenderKind,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub attachments: Vec<AttachmentResponse>,
}

impl From<TicketThreadEntry> for TicketMessageResponse {
    fn from(entry: TicketThreadEntry) -> Self {
        Self {
            id: entry.message.id,
            sender: entry.message.sender,
            body: entry.message.body,
            created_at: entry.message.created_at,
            attachments: entry
                .attachments
                .into_iter()
                .map(|a| AttachmentResponse {
                    id: a.id,
                    original_filename: a.original_filename,
                    mime_type: a.mime_type,
                    created_at: a.created_at,
                })
                .collect(),
        }
    }
}

/// Message attachment
#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    pub id: Uuid,
    pub original_filename: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
}

/// Ticket creation acknowledgement
#[derive(Debug, Serialize)]
pub struct TicketCreatedResponse {
    pub ticket_id: Uuid,
}

/// Reply acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageCreatedResponse {
    pub message_id: Uuid,
}

// ============================================================================
// Profile Responses
// ============================================================================

/// Own profile with activity counts
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub registration_count: i64,
    pub ticket_count: i64,
}

// ============================================================================
// Admin Responses
// ============================================================================

/// One duplicate-hash group in the fraud report
#[derive(Debug, Serialize)]
pub struct DuplicateGroupResponse {
    pub hash: String,
    pub registration_count: i64,
    pub registration_ids: Vec<Uuid>,
}

impl From<DuplicateHashGroup> for DuplicateGroupResponse {
    fn from(group: DuplicateHashGroup) -> Self {
        Self {
            hash: group.sha256_hash,
            registration_count: group.registration_count,
            registration_ids: group.registration_ids,
        }
    }
}

/// Dashboard stats
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_customers: i64,
    pub total_registrations: i64,
    pub pending_registrations: i64,
    pub active_warranties: i64,
    pub open_tickets: i64,
    pub registrations_by_month: Vec<MonthlyCountResponse>,
}

/// Registrations submitted in one calendar month
#[derive(Debug, Serialize)]
pub struct MonthlyCountResponse {
    pub month: DateTime<Utc>,
    pub count: i64,
}

impl From<MonthlyRegistrationCount> for MonthlyCountResponse {
    fn from(count: MonthlyRegistrationCount) -> Self {
        Self {
            month: count.month,
            count: count.count,
        }
    }
}

/// Customer row in the admin user list
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub registration_count: i64,
    pub ticket_count: i64,
}

impl From<CustomerSummary> for CustomerResponse {
    fn from(summary: CustomerSummary) -> Self {
        Self {
            user: UserResponse::from(&summary.user),
            registration_count: summary.registration_count,
            ticket_count: summary.ticket_count,
        }
    }
}

/// Admin customer detail with registrations and tickets
#[derive(Debug, Serialize)]
pub struct CustomerDetailResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub registrations: Vec<RegistrationResponse>,
    pub tickets: Vec<TicketBriefResponse>,
}

/// Ticket line in the customer detail view
#[derive(Debug, Serialize)]
pub struct TicketBriefResponse {
    pub id: Uuid,
    pub subject: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerOverview> for CustomerDetailResponse {
    fn from(overview: CustomerOverview) -> Self {
        Self {
            user: UserResponse::from(&overview.user),
            registrations: overview
                .registrations
                .into_iter()
                .map(RegistrationResponse::from)
                .collect(),
            tickets: overview
                .tickets
                .into_iter()
                .map(|t| TicketBriefResponse {
                    id: t.id,
                    subject: t.subject,
                    status: t.status,
                    created_at: t.created_at,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Health Responses
// ============================================================================

/// Liveness probe body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    #[must_use]
    pub fn healthy() -> Self {
        Self {
            status: "ok",
            timestamp: Utc::now(),
        }
    }
}

/// Readiness probe body with dependency health
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: HealthChecks,
}

/// Individual dependency checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: bool,
    pub redis: bool,
}

impl ReadinessResponse {
    #[must_use]
    pub fn ready(database: bool, redis: bool) -> Self {
        Self {
            status: if database && redis { "ready" } else { "degraded" },
            checks: HealthChecks { database, redis },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_total_pages() {
        let response = PaginatedResponse::new(vec![1, 2, 3], 1, 20, 41);
        assert_eq!(response.meta.total_pages, 3);

        let response = PaginatedResponse::new(Vec::<i32>::new(), 1, 20, 0);
        assert_eq!(response.meta.total_pages, 0);

        let response = PaginatedResponse::new(vec![1], 1, 20, 20);
        assert_eq!(response.meta.total_pages, 1);
    }

    #[test]
    fn test_readiness_degraded_when_dependency_down() {
        let response = ReadinessResponse::ready(true, false);
        assert_eq!(response.status, "degraded");

        let response = ReadinessResponse::ready(true, true);
        assert_eq!(response.status, "ready");
    }
}
