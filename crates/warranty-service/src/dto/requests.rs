//! Request DTOs for API endpoints
//!
//! All JSON request DTOs implement `Deserialize` and `Validate` so
//! malformed input is rejected before it reaches workflow logic.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};
use warranty_core::{RegistrationStatus, TicketPriority, TicketStatus};

/// Accepts international phone numbers: optional leading +, 8-15 digits,
/// no leading zero.
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = digits.len() >= 8
        && digits.len() <= 15
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Invalid phone number format".into());
        Err(err)
    }
}

/// A 6-digit numeric code
fn validate_otp(otp: &str) -> Result<(), ValidationError> {
    if otp.len() == 6 && otp.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("otp");
        err.message = Some("OTP must be 6 digits".into());
        Err(err)
    }
}

fn validate_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    if tags.len() > 10 {
        let mut err = ValidationError::new("tags");
        err.message = Some("At most 10 tags allowed".into());
        return Err(err);
    }
    if tags.iter().any(|t| t.is_empty() || t.len() > 50) {
        let mut err = ValidationError::new("tags");
        err.message = Some("Tags must be 1-50 characters".into());
        return Err(err);
    }
    Ok(())
}

// ============================================================================
// Auth Requests
// ============================================================================

/// Account registration request. At least one of email/phone is required;
/// that cross-field rule is enforced by the auth service.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(custom(function = validate_phone))]
    pub phone: Option<String>,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,

    /// Consent to data processing; must be true to register
    pub consent: bool,
}

/// OTP verification request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(length(min = 1))]
    pub identifier: String,

    #[validate(custom(function = validate_otp))]
    pub otp: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub identifier: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Forgot-password request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(length(min = 1))]
    pub identifier: String,
}

/// Reset-password request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,
}

// ============================================================================
// Profile Requests
// ============================================================================

/// Profile update request; absent fields are left unchanged
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(custom(function = validate_phone))]
    pub phone: Option<String>,
}

// ============================================================================
// Product Registration Requests
// ============================================================================

/// Product registration submission fields (the text parts of the
/// multipart form; evidence files arrive separately)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterProductRequest {
    pub mattress_model_id: Uuid,
    pub purchase_source_id: Uuid,
    pub purchase_date: DateTime<Utc>,
    pub received_undamaged: bool,
    pub info_accurate: bool,
}

/// An uploaded file carried from the HTTP layer into the workflow
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

// ============================================================================
// Support Ticket Requests
// ============================================================================

/// Ticket creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[validate(length(min = 5, max = 200, message = "Subject must be 5-200 characters"))]
    pub subject: String,

    #[validate(length(min = 10, max = 5000, message = "Message must be 10-5000 characters"))]
    pub body: String,
}

/// Ticket reply request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TicketMessageRequest {
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub body: String,
}

// ============================================================================
// Admin Requests
// ============================================================================

/// Review decision for a registration
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRegistrationStatusRequest {
    pub status: RegistrationStatus,

    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// Standalone admin note
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminNoteRequest {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// Admin ticket status update
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTicketStatusRequest {
    pub status: TicketStatus,
}

/// Admin ticket tag replacement
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTicketTagsRequest {
    #[validate(custom(function = validate_tags))]
    pub tags: Vec<String>,
}

// ============================================================================
// Query Requests
// ============================================================================

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

/// Plain page/limit query
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl PageQuery {
    /// Clamp page and limit to sane bounds
    #[must_use]
    pub fn clamped(&self) -> (i64, i64) {
        (self.page.max(1), self.limit.clamp(1, 100))
    }
}

/// Admin registration list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub status: Option<RegistrationStatus>,
    pub model_id: Option<Uuid>,
    pub source_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
}

/// Admin ticket list filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_validation() {
        assert!(validate_phone("+994501234567").is_ok());
        assert!(validate_phone("15551234567").is_ok());
        assert!(validate_phone("0123").is_err());
        assert!(validate_phone("+0501234567").is_err());
        assert!(validate_phone("not-a-number").is_err());
    }

    #[test]
    fn test_otp_validation() {
        assert!(validate_otp("123456").is_ok());
        assert!(validate_otp("12345").is_err());
        assert!(validate_otp("12345a").is_err());
    }

    #[test]
    fn test_tags_validation() {
        assert!(validate_tags(&vec!["delivery".to_string()]).is_ok());
        assert!(validate_tags(&vec![String::new()]).is_err());
        assert!(validate_tags(&vec!["x".repeat(51)]).is_err());
        assert!(validate_tags(&(0..11).map(|i| format!("t{i}")).collect()).is_err());
    }

    #[test]
    fn test_register_request_validates_email() {
        let request = RegisterRequest {
            email: Some("not-an-email".to_string()),
            phone: None,
            password: "GoodPass1".to_string(),
            first_name: None,
            last_name: None,
            consent: true,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_page_query_clamping() {
        let query = PageQuery { page: 0, limit: 500 };
        assert_eq!(query.clamped(), (1, 100));

        let query = PageQuery::default();
        assert_eq!(query.clamped(), (1, 20));
    }
}
