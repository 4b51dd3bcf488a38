//! User entity <-> model mapper

use warranty_core::{DomainError, User, UserRole};

use crate::models::UserModel;

use super::invalid_enum;

impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        let role = UserRole::parse(&model.role).ok_or_else(|| invalid_enum("role", &model.role))?;

        Ok(User {
            id: model.id,
            email: model.email,
            phone: model.phone,
            first_name: model.first_name,
            last_name: model.last_name,
            role,
            is_verified: model.is_verified,
            consent_at: model.consent_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn model(role: &str) -> UserModel {
        let now = Utc::now();
        UserModel {
            id: Uuid::new_v4(),
            email: Some("a@example.com".to_string()),
            phone: None,
            first_name: None,
            last_name: None,
            role: role.to_string(),
            is_verified: true,
            consent_at: Some(now),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_maps_known_role() {
        let user = User::try_from(model("ADMIN")).unwrap();
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn test_rejects_unknown_role() {
        assert!(User::try_from(model("SUPERUSER")).is_err());
    }
}
