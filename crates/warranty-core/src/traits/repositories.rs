//! Repository and collaborator traits (ports)
//!
//! The domain layer defines what it needs from storage, caching, file
//! handling, and notification transports; the infrastructure crates provide
//! the implementations. Multi-entity mutations are single trait methods so
//! an implementation can wrap them in one database transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::{
    AdminNote, MattressModel, PhotoKind, ProductRegistration, PurchaseSource, RegistrationPhoto,
    RegistrationStatus, SenderKind, SourceType, SupportTicket, TicketAttachment, TicketMessage,
    TicketPriority, TicketStatus, User, Warranty,
};
use crate::error::DomainError;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

/// Customer row for the admin user list, with activity counts
#[derive(Debug, Clone)]
pub struct CustomerSummary {
    pub user: User,
    pub registration_count: i64,
    pub ticket_count: i64,
}

/// Full customer view for the admin user detail page
#[derive(Debug, Clone)]
pub struct CustomerOverview {
    pub user: User,
    pub registrations: Vec<RegistrationOverview>,
    pub tickets: Vec<SupportTicket>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a non-deleted user by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    /// Find a non-deleted user by email or phone
    async fn find_by_identifier(&self, identifier: &str) -> RepoResult<Option<User>>;

    /// Check whether any account already uses one of the given identifiers
    async fn identifier_exists(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> RepoResult<bool>;

    /// Check whether another account already uses this email
    async fn email_taken(&self, email: &str, excluding: Uuid) -> RepoResult<bool>;

    /// Check whether another account already uses this phone number
    async fn phone_taken(&self, phone: &str, excluding: Uuid) -> RepoResult<bool>;

    /// Create a new user
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Update profile fields (names, email, phone)
    async fn update_profile(&self, user: &User) -> RepoResult<()>;

    /// Mark a user's identifier as verified
    async fn mark_verified(&self, id: Uuid) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: Uuid) -> RepoResult<Option<String>>;

    /// Replace the stored password hash
    async fn update_password(&self, id: Uuid, password_hash: &str) -> RepoResult<()>;

    /// Registration and ticket counts for the profile view
    async fn activity_counts(&self, id: Uuid) -> RepoResult<(i64, i64)>;

    /// Count non-deleted customers
    async fn count_customers(&self) -> RepoResult<i64>;

    /// Page of non-deleted customers with activity counts, newest first
    async fn list_customers(&self, page: i64, limit: i64)
        -> RepoResult<(Vec<CustomerSummary>, i64)>;

    /// Full customer view with registrations and tickets
    async fn customer_overview(&self, id: Uuid) -> RepoResult<Option<CustomerOverview>>;
}

// ============================================================================
// Catalog Repository
// ============================================================================

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Find a mattress model by ID
    async fn find_model(&self, id: Uuid) -> RepoResult<Option<MattressModel>>;

    /// Find a purchase source by ID
    async fn find_source(&self, id: Uuid) -> RepoResult<Option<PurchaseSource>>;

    /// Active mattress models, name-ordered
    async fn list_active_models(&self) -> RepoResult<Vec<MattressModel>>;

    /// Active purchase sources, name-ordered
    async fn list_active_sources(&self) -> RepoResult<Vec<PurchaseSource>>;
}

// ============================================================================
// Registration Repository
// ============================================================================

/// Values for a registration row to be inserted
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub id: Uuid,
    pub user_id: Uuid,
    pub model_id: Uuid,
    pub source_id: Uuid,
    pub purchase_date: DateTime<Utc>,
    pub received_undamaged: bool,
    pub info_accurate: bool,
}

/// Values for the pending warranty created alongside a registration
#[derive(Debug, Clone)]
pub struct NewWarranty {
    pub id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Values for an evidence photo row
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub id: Uuid,
    pub kind: PhotoKind,
    pub original_filename: String,
    pub storage_path: String,
    pub mime_type: String,
    pub file_size: i64,
    pub sha256_hash: String,
}

/// Values for an admin audit note
#[derive(Debug, Clone)]
pub struct NewNote {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub content: String,
}

/// Existing photo matching a freshly uploaded content hash
#[derive(Debug, Clone)]
pub struct PhotoHashHit {
    pub photo_id: Uuid,
    pub registration_id: Uuid,
}

/// Warranty side effect applied with a review decision
#[derive(Debug, Clone, Copy)]
pub enum WarrantyTransition {
    Activate { activated_at: DateTime<Utc> },
    Void,
}

/// Full review decision applied in one transaction: new status, rejection
/// reason handling, warranty flip, and optional audit note.
#[derive(Debug, Clone)]
pub struct ReviewUpdate {
    pub status: RegistrationStatus,
    pub rejection_reason: Option<String>,
    pub warranty: Option<WarrantyTransition>,
    pub note: Option<NewNote>,
}

/// Filters for the admin registration list
#[derive(Debug, Clone, Default)]
pub struct RegistrationFilter {
    pub status: Option<RegistrationStatus>,
    pub model_id: Option<Uuid>,
    pub source_id: Option<Uuid>,
    pub purchased_from: Option<DateTime<Utc>>,
    pub purchased_to: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

/// Registration joined with everything its list/detail views need
#[derive(Debug, Clone)]
pub struct RegistrationOverview {
    pub registration: ProductRegistration,
    pub user: User,
    pub model_name: String,
    pub model_slug: String,
    pub warranty_months: u32,
    pub source_name: String,
    pub source_type: SourceType,
    pub warranty: Option<Warranty>,
    pub photos: Vec<RegistrationPhoto>,
    pub note_count: i64,
}

/// One duplicate-hash group in the fraud report
#[derive(Debug, Clone)]
pub struct DuplicateHashGroup {
    pub sha256_hash: String,
    pub registration_count: i64,
    pub registration_ids: Vec<Uuid>,
}

/// Registrations submitted in one calendar month
#[derive(Debug, Clone)]
pub struct MonthlyRegistrationCount {
    pub month: DateTime<Utc>,
    pub count: i64,
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Insert a registration, its pending warranty, and all photo rows as
    /// one atomic unit.
    async fn create(
        &self,
        registration: &NewRegistration,
        warranty: &NewWarranty,
        photos: &[NewPhoto],
    ) -> RepoResult<()>;

    /// Find a registration by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ProductRegistration>>;

    /// Find a registration by ID scoped to its owner
    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> RepoResult<Option<ProductRegistration>>;

    /// Whether the user owns at least one registration
    async fn exists_for_user(&self, user_id: Uuid) -> RepoResult<bool>;

    /// All registrations of a user with joined details, newest first
    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<RegistrationOverview>>;

    /// Single registration with joined details
    async fn overview(&self, id: Uuid) -> RepoResult<Option<RegistrationOverview>>;

    /// Filtered admin page with joined details and the unfiltered-total count
    async fn list_filtered(
        &self,
        filter: &RegistrationFilter,
    ) -> RepoResult<(Vec<RegistrationOverview>, i64)>;

    /// Photos anywhere in the system already carrying this content hash
    async fn find_photos_by_hash(&self, sha256_hash: &str) -> RepoResult<Vec<PhotoHashHit>>;

    /// Insert photo rows and optionally revert the status to pending
    /// review, as one atomic unit.
    async fn add_photos(
        &self,
        id: Uuid,
        photos: &[NewPhoto],
        revert_to_pending: bool,
    ) -> RepoResult<()>;

    /// Apply a review decision (status, reason, warranty flip, audit note)
    /// as one atomic unit.
    async fn apply_review(&self, id: Uuid, update: &ReviewUpdate) -> RepoResult<()>;

    /// Audit notes for a registration, newest first
    async fn list_notes(&self, id: Uuid) -> RepoResult<Vec<AdminNote>>;

    /// Append a standalone audit note
    async fn add_note(&self, id: Uuid, note: &NewNote) -> RepoResult<AdminNote>;

    /// Content hashes referenced by more than one registration, by
    /// descending registration count, capped at `limit` groups.
    async fn duplicate_hash_report(&self, limit: i64) -> RepoResult<Vec<DuplicateHashGroup>>;

    /// Per-month submission counts over the trailing window
    async fn monthly_counts(&self, months_back: i32) -> RepoResult<Vec<MonthlyRegistrationCount>>;

    /// Count all registrations
    async fn count_all(&self) -> RepoResult<i64>;

    /// Count registrations in a status
    async fn count_by_status(&self, status: RegistrationStatus) -> RepoResult<i64>;
}

// ============================================================================
// Warranty Repository
// ============================================================================

/// Warranty joined with the model facts its detail view reports
#[derive(Debug, Clone)]
pub struct WarrantySummary {
    pub warranty: Warranty,
    pub model_name: String,
    pub warranty_months: u32,
}

#[async_trait]
pub trait WarrantyRepository: Send + Sync {
    /// Find the warranty belonging to a registration
    async fn find_by_registration(&self, registration_id: Uuid) -> RepoResult<Option<Warranty>>;

    /// Warranty with model facts, scoped to the registration owner
    async fn summary_for_registration(
        &self,
        registration_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<Option<WarrantySummary>>;

    /// Flip every active warranty whose end date has passed to expired;
    /// returns the number of rows changed. Idempotent.
    async fn expire_overdue(&self, now: DateTime<Utc>) -> RepoResult<u64>;

    /// Count warranties stored as active
    async fn count_active(&self) -> RepoResult<i64>;
}

// ============================================================================
// Ticket Repository
// ============================================================================

/// Values for a ticket row to be inserted
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub priority: TicketPriority,
}

/// Values for a ticket message row
#[derive(Debug, Clone)]
pub struct NewTicketMessage {
    pub id: Uuid,
    pub sender: SenderKind,
    pub sender_id: Uuid,
    pub body: String,
}

/// Values for a message attachment row
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub id: Uuid,
    pub original_filename: String,
    pub storage_path: String,
    pub mime_type: String,
    pub file_size: i64,
}

/// Status written alongside a message or an admin status update. The
/// service computes the closed-timestamp stamping rule; the repository
/// just persists it.
#[derive(Debug, Clone, Copy)]
pub struct TicketStatusChange {
    pub status: TicketStatus,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Filters for the admin ticket list
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
}

/// Ticket joined with what its list views need
#[derive(Debug, Clone)]
pub struct TicketOverview {
    pub ticket: SupportTicket,
    pub user: User,
    pub message_count: i64,
    pub last_message: Option<TicketMessage>,
}

/// One message in a ticket thread with its attachments
#[derive(Debug, Clone)]
pub struct TicketThreadEntry {
    pub message: TicketMessage,
    pub attachments: Vec<TicketAttachment>,
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Insert the ticket and its first customer message as one atomic unit
    async fn create_with_message(
        &self,
        ticket: &NewTicket,
        message: &NewTicketMessage,
    ) -> RepoResult<()>;

    /// Find a ticket by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<SupportTicket>>;

    /// Find a ticket by ID scoped to its owner
    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> RepoResult<Option<SupportTicket>>;

    /// All tickets of a user with joined details, most recently updated first
    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<TicketOverview>>;

    /// Filtered admin page with joined details and the total count
    async fn list_filtered(&self, filter: &TicketFilter)
        -> RepoResult<(Vec<TicketOverview>, i64)>;

    /// Full message thread, oldest first, with attachments
    async fn thread(&self, id: Uuid) -> RepoResult<Vec<TicketThreadEntry>>;

    /// Append a message with its attachments and optionally move the ticket
    /// status, as one atomic unit.
    async fn append_message(
        &self,
        id: Uuid,
        message: &NewTicketMessage,
        attachments: &[NewAttachment],
        status_change: Option<TicketStatusChange>,
    ) -> RepoResult<()>;

    /// Set the ticket status and closed timestamp
    async fn update_status(&self, id: Uuid, change: TicketStatusChange) -> RepoResult<()>;

    /// Replace the ticket tag list
    async fn update_tags(&self, id: Uuid, tags: &[String]) -> RepoResult<()>;

    /// Count tickets that are open or in progress
    async fn count_open(&self) -> RepoResult<i64>;
}

// ============================================================================
// Refresh Token Repository
// ============================================================================

/// Row returned by consuming (deleting) a refresh token
#[derive(Debug, Clone)]
pub struct ConsumedRefreshToken {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Persist a freshly issued token
    async fn issue(&self, token: &str, user_id: Uuid, expires_at: DateTime<Utc>)
        -> RepoResult<()>;

    /// Atomically delete the token and return its row. Exactly one of any
    /// number of concurrent callers presenting the same token observes the
    /// row; the rest see `None`. An expired row is still consumed so the
    /// caller can reject it without leaving it behind.
    async fn consume(&self, token: &str) -> RepoResult<Option<ConsumedRefreshToken>>;

    /// Delete a specific token (logout); missing token is a no-op
    async fn revoke(&self, token: &str) -> RepoResult<()>;

    /// Delete every token of a user (password reset); returns rows removed
    async fn revoke_all_for_user(&self, user_id: Uuid) -> RepoResult<u64>;
}

// ============================================================================
// Collaborator Ports
// ============================================================================

/// Fast expiring key-value store used for OTP codes, attempt counters, and
/// password-reset tokens. Increment and set-with-expiry are the atomic
/// primitives concurrent verification attempts race on.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> RepoResult<()>;

    async fn get(&self, key: &str) -> RepoResult<Option<String>>;

    /// Atomic increment; creates the key at 1 when absent
    async fn increment(&self, key: &str) -> RepoResult<i64>;

    async fn expire(&self, key: &str, ttl_seconds: u64) -> RepoResult<bool>;

    async fn delete(&self, key: &str) -> RepoResult<bool>;
}

/// Notification transport. Fire-and-forget from the workflow's
/// perspective; callers log failures instead of propagating them.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> RepoResult<()>;

    async fn send_sms(&self, to: &str, body: &str) -> RepoResult<()>;
}

/// File storage. Accepts bytes, returns a stable path the database rows
/// reference; local-disk and object-store backings look the same here.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn store(&self, original_filename: &str, bytes: &[u8]) -> RepoResult<String>;
}
