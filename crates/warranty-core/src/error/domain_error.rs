//! Domain errors - error types for the domain layer

use thiserror::Error;
use uuid::Uuid;

use crate::entities::RegistrationStatus;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Mattress model not found: {0}")]
    ModelNotFound(Uuid),

    #[error("Purchase source not found: {0}")]
    SourceNotFound(Uuid),

    #[error("Registration not found: {0}")]
    RegistrationNotFound(Uuid),

    #[error("Warranty record not found for registration: {0}")]
    WarrantyNotFound(Uuid),

    #[error("Ticket not found: {0}")]
    TicketNotFound(Uuid),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Either an email address or a phone number is required")]
    MissingIdentifier,

    #[error("At least {required} photos required (label + invoice)")]
    NotEnoughPhotos { required: usize },

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("An account with this email or phone already exists")]
    IdentifierTaken,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Phone number already in use")]
    PhoneInUse,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Mattress model is not available for registration")]
    InactiveModel,

    #[error("Purchase source is not available for registration")]
    InactiveSource,

    #[error("Purchase date cannot be before the model release date")]
    PurchaseBeforeRelease,

    #[error("Purchase date cannot be in the future")]
    PurchaseInFuture,

    #[error("Purchase date cannot be older than {max_days} days")]
    PurchaseTooOld { max_days: i64 },

    #[error("Registration cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: RegistrationStatus,
        to: RegistrationStatus,
    },

    #[error("Cannot add photos to a registration in status {0}")]
    PhotosNotAccepted(RegistrationStatus),

    #[error("A registered product is required before opening a support ticket")]
    NoRegisteredProduct,

    #[error("This ticket is closed")]
    TicketClosed,

    #[error("This ticket is closed and can no longer receive messages")]
    TicketReopenWindowExpired,

    #[error("Too many verification attempts, request a new code")]
    OtpAttemptsExceeded,

    #[error("Invalid or expired verification code")]
    OtpInvalid,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Notification error: {0}")]
    NotificationError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ModelNotFound(_) => "UNKNOWN_MODEL",
            Self::SourceNotFound(_) => "UNKNOWN_SOURCE",
            Self::RegistrationNotFound(_) => "UNKNOWN_REGISTRATION",
            Self::WarrantyNotFound(_) => "UNKNOWN_WARRANTY",
            Self::TicketNotFound(_) => "UNKNOWN_TICKET",

            // Validation
            Self::MissingIdentifier => "MISSING_IDENTIFIER",
            Self::NotEnoughPhotos { .. } => "NOT_ENOUGH_PHOTOS",

            // Conflict
            Self::IdentifierTaken => "IDENTIFIER_TAKEN",
            Self::EmailInUse => "EMAIL_IN_USE",
            Self::PhoneInUse => "PHONE_IN_USE",

            // Business Rules
            Self::InactiveModel => "INACTIVE_MODEL",
            Self::InactiveSource => "INACTIVE_SOURCE",
            Self::PurchaseBeforeRelease => "PURCHASE_BEFORE_RELEASE",
            Self::PurchaseInFuture => "PURCHASE_IN_FUTURE",
            Self::PurchaseTooOld { .. } => "PURCHASE_TOO_OLD",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::PhotosNotAccepted(_) => "PHOTOS_NOT_ACCEPTED",
            Self::NoRegisteredProduct => "NO_REGISTERED_PRODUCT",
            Self::TicketClosed => "TICKET_CLOSED",
            Self::TicketReopenWindowExpired => "TICKET_REOPEN_WINDOW_EXPIRED",
            Self::OtpAttemptsExceeded => "OTP_ATTEMPTS_EXCEEDED",
            Self::OtpInvalid => "OTP_INVALID",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::StorageError(_) => "STORAGE_ERROR",
            Self::NotificationError(_) => "NOTIFICATION_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::ModelNotFound(_)
                | Self::SourceNotFound(_)
                | Self::RegistrationNotFound(_)
                | Self::WarrantyNotFound(_)
                | Self::TicketNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingIdentifier | Self::NotEnoughPhotos { .. })
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::IdentifierTaken | Self::EmailInUse | Self::PhoneInUse
        )
    }

    /// Check if this is a business-rule violation
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            Self::InactiveModel
                | Self::InactiveSource
                | Self::PurchaseBeforeRelease
                | Self::PurchaseInFuture
                | Self::PurchaseTooOld { .. }
                | Self::InvalidStatusTransition { .. }
                | Self::PhotosNotAccepted(_)
                | Self::NoRegisteredProduct
                | Self::TicketClosed
                | Self::TicketReopenWindowExpired
                | Self::OtpAttemptsExceeded
                | Self::OtpInvalid
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::UserNotFound(Uuid::new_v4());
        assert_eq!(err.code(), "UNKNOWN_USER");

        let err = DomainError::OtpAttemptsExceeded;
        assert_eq!(err.code(), "OTP_ATTEMPTS_EXCEEDED");
    }

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::RegistrationNotFound(Uuid::new_v4()).is_not_found());
        assert!(DomainError::TicketNotFound(Uuid::new_v4()).is_not_found());
        assert!(!DomainError::IdentifierTaken.is_not_found());
    }

    #[test]
    fn test_is_business_rule() {
        assert!(DomainError::PurchaseBeforeRelease.is_business_rule());
        assert!(DomainError::NoRegisteredProduct.is_business_rule());
        assert!(DomainError::TicketReopenWindowExpired.is_business_rule());
        assert!(!DomainError::EmailInUse.is_business_rule());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::InvalidStatusTransition {
            from: RegistrationStatus::Rejected,
            to: RegistrationStatus::Approved,
        };
        assert_eq!(
            err.to_string(),
            "Registration cannot move from REJECTED to APPROVED"
        );

        let err = DomainError::PurchaseTooOld { max_days: 365 };
        assert_eq!(
            err.to_string(),
            "Purchase date cannot be older than 365 days"
        );
    }
}
