//! Test fixtures and response shapes for integration tests

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Account registration request
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub consent: bool,
}

impl RegisterRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            email: format!("test{}_{suffix}@example.com", Uuid::new_v4().simple()),
            password: "TestPass123".to_string(),
            first_name: format!("Tester{suffix}"),
            consent: true,
        }
    }
}

/// OTP verification request
#[derive(Debug, Serialize)]
pub struct VerifyOtpRequest {
    pub identifier: String,
    pub otp: String,
}

/// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_register(reg: &RegisterRequest) -> Self {
        Self {
            identifier: reg.email.clone(),
            password: reg.password.clone(),
        }
    }
}

/// Ticket creation request
#[derive(Debug, Serialize)]
pub struct CreateTicketRequest {
    pub subject: String,
    pub body: String,
}

impl CreateTicketRequest {
    pub fn sample() -> Self {
        Self {
            subject: "Mattress sagging in the middle".to_string(),
            body: "The mattress started sagging after six months of normal use.".to_string(),
        }
    }
}

// ============================================================================
// Response shapes
// ============================================================================

/// Registration acknowledgement
#[derive(Debug, Deserialize)]
pub struct RegisteredResponse {
    pub user_id: Uuid,
    pub message: String,
}

/// Session response
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

/// User in session responses
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: String,
    pub is_verified: bool,
}

/// Product registration acknowledgement
#[derive(Debug, Deserialize)]
pub struct RegistrationCreatedResponse {
    pub registration_id: Uuid,
    pub status: String,
}

/// Warranty detail response
#[derive(Debug, Deserialize)]
pub struct WarrantyResponse {
    pub status: String,
    pub days_remaining: i64,
    pub warranty_months: u32,
}

/// Ticket creation acknowledgement
#[derive(Debug, Deserialize)]
pub struct TicketCreatedResponse {
    pub ticket_id: Uuid,
}

/// Duplicate-hash report row
#[derive(Debug, Deserialize)]
pub struct DuplicateGroupResponse {
    pub hash: String,
    pub registration_count: i64,
    pub registration_ids: Vec<Uuid>,
}

/// Error envelope
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
