//! Password hashing and verification utilities
//!
//! Argon2id with per-hash random salts; verification runs through the
//! crate's constant-time comparison.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;

use crate::error::AppError;

/// Hash a password with Argon2id and a fresh salt
///
/// # Errors
/// Returns an error if hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Check a password against a stored hash. Errors only when the stored
/// hash itself cannot be parsed.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Minimum accepted password: 8+ characters with an uppercase letter, a
/// lowercase letter, and a digit.
///
/// # Errors
/// Returns a validation error naming the first unmet requirement
pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    let unmet = if password.len() < 8 {
        Some("be at least 8 characters long")
    } else if !password.chars().any(char::is_uppercase) {
        Some("contain at least one uppercase letter")
    } else if !password.chars().any(char::is_lowercase) {
        Some("contain at least one lowercase letter")
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("contain at least one digit")
    } else {
        None
    };

    match unmet {
        Some(rule) => Err(AppError::Validation(format!("Password must {rule}"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_argon2_and_fresh_salts() {
        let password = "CorrectHorse1";
        let hash = hash_password(password).unwrap();
        assert!(hash.starts_with("$argon2"));

        let hash2 = hash_password(password).unwrap();
        assert_ne!(hash, hash2);
    }

    #[test]
    fn test_verify_accepts_matching_password() {
        let hash = hash_password("CorrectHorse1").unwrap();
        assert!(verify_password("CorrectHorse1", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hash = hash_password("CorrectHorse1").unwrap();
        assert!(!verify_password("WrongHorse1", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("CorrectHorse1", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_strength_accepts_valid_passwords() {
        assert!(validate_password_strength("Abcdefg1").is_ok());
        assert!(validate_password_strength("S3curePassword").is_ok());
    }

    #[test]
    fn test_strength_rejects_short_password() {
        let result = validate_password_strength("Ab1");
        assert!(matches!(result, Err(AppError::Validation(ref msg)) if msg.contains("8 characters")));
    }

    #[test]
    fn test_strength_rejects_missing_classes() {
        assert!(validate_password_strength("alllowercase1").is_err());
        assert!(validate_password_strength("ALLUPPERCASE1").is_err());
        assert!(validate_password_strength("NoDigitsHere").is_err());
    }
}
