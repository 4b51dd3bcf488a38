//! User entity - a customer or admin account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Customer,
    Admin,
}

impl UserRole {
    /// Database representation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Admin => "ADMIN",
        }
    }

    /// Parse from the database representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CUSTOMER" => Some(Self::Customer),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity. At least one of email/phone is always present; accounts are
/// soft-deleted only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub is_verified: bool,
    pub consent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new unverified customer account
    pub fn new(id: Uuid, email: Option<String>, phone: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            phone,
            first_name: None,
            last_name: None,
            role: UserRole::Customer,
            is_verified: false,
            consent_at: Some(now),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// The login/lookup identifier: email when present, phone otherwise
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.email.as_deref().or(self.phone.as_deref())
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_prefers_email() {
        let user = User::new(
            Uuid::new_v4(),
            Some("a@example.com".to_string()),
            Some("+994501234567".to_string()),
        );
        assert_eq!(user.identifier(), Some("a@example.com"));
    }

    #[test]
    fn test_identifier_falls_back_to_phone() {
        let user = User::new(Uuid::new_v4(), None, Some("+994501234567".to_string()));
        assert_eq!(user.identifier(), Some("+994501234567"));
    }

    #[test]
    fn test_new_user_defaults() {
        let user = User::new(Uuid::new_v4(), Some("a@example.com".to_string()), None);
        assert_eq!(user.role, UserRole::Customer);
        assert!(!user.is_verified);
        assert!(!user.is_admin());
        assert!(!user.is_deleted());
        assert!(user.consent_at.is_some());
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::parse("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("CUSTOMER"), Some(UserRole::Customer));
        assert_eq!(UserRole::parse("other"), None);
        assert_eq!(UserRole::Admin.as_str(), "ADMIN");
    }
}
