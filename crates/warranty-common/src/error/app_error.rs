//! Application error types

use warranty_core::DomainError;

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Application-wide error type. Domain errors pass through transparently;
/// the other variants cover authentication outcomes and infrastructure
/// failures that have no domain representation.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication outcomes. Invalid identifier and invalid password
    // share one variant so callers cannot tell which part was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Account not verified. A new verification code has been sent.")]
    AccountNotVerified,

    // Input failures
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Resource failures
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Infrastructure failures, all surfaced as 500
    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AppError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidInput(_) => 400,
            Self::InvalidCredentials | Self::InvalidToken | Self::TokenExpired => 401,
            Self::AccountNotVerified => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Cache(_) | Self::Config(_) | Self::Internal(_) => 500,
            Self::Domain(e) if e.is_not_found() => 404,
            Self::Domain(e) if e.is_conflict() => 409,
            Self::Domain(e) if e.is_validation() || e.is_business_rule() => 400,
            Self::Domain(_) => 500,
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::AccountNotVerified => "ACCOUNT_NOT_VERIFIED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Domain(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidCredentials.status_code(), 401);
        assert_eq!(AppError::AccountNotVerified.status_code(), 403);
        assert_eq!(AppError::NotFound("user".to_string()).status_code(), 404);
        assert_eq!(AppError::Validation("test".to_string()).status_code(), 400);
        assert_eq!(AppError::Database("test".to_string()).status_code(), 500);
    }

    #[test]
    fn test_domain_error_mapping() {
        assert_eq!(
            AppError::Domain(DomainError::RegistrationNotFound(Uuid::new_v4())).status_code(),
            404
        );
        assert_eq!(
            AppError::Domain(DomainError::PurchaseBeforeRelease).status_code(),
            400
        );
        assert_eq!(
            AppError::Domain(DomainError::IdentifierTaken).status_code(),
            409
        );
        assert_eq!(
            AppError::Domain(DomainError::DatabaseError("boom".to_string())).status_code(),
            500
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::InvalidCredentials.error_code(),
            "INVALID_CREDENTIALS"
        );
        assert_eq!(
            AppError::NotFound("user".to_string()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            AppError::Domain(DomainError::OtpAttemptsExceeded).error_code(),
            "OTP_ATTEMPTS_EXCEEDED"
        );
    }
}
