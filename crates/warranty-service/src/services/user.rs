//! Profile service
//!
//! Own-profile reads and updates with identifier uniqueness checks.

use tracing::{info, instrument};
use uuid::Uuid;

use warranty_core::DomainError;

use crate::dto::{ProfileResponse, UpdateProfileRequest, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Profile service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Own profile with registration and ticket counts
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: Uuid) -> ServiceResult<ProfileResponse> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        let (registration_count, ticket_count) =
            self.ctx.user_repo().activity_counts(user_id).await?;

        Ok(ProfileResponse {
            user: UserResponse::from(&user),
            registration_count,
            ticket_count,
        })
    }

    /// Update profile fields. Changing the email or phone requires the new
    /// identifier to be unused by any other account.
    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> ServiceResult<UserResponse> {
        let mut user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        if let Some(ref email) = request.email {
            if self.ctx.user_repo().email_taken(email, user_id).await? {
                return Err(ServiceError::Domain(DomainError::EmailInUse));
            }
        }
        if let Some(ref phone) = request.phone {
            if self.ctx.user_repo().phone_taken(phone, user_id).await? {
                return Err(ServiceError::Domain(DomainError::PhoneInUse));
            }
        }

        if let Some(first_name) = request.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = request.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(email) = request.email {
            user.email = Some(email);
        }
        if let Some(phone) = request.phone {
            user.phone = Some(phone);
        }

        self.ctx.user_repo().update_profile(&user).await?;

        info!(user_id = %user_id, "Profile updated");
        Ok(UserResponse::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{seed_user, test_harness};

    #[tokio::test]
    async fn test_profile_includes_activity_counts() {
        let harness = test_harness();
        let service = UserService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let profile = service.profile(user.id).await.unwrap();

        assert_eq!(profile.user.id, user.id);
        assert_eq!(profile.registration_count, 0);
        assert_eq!(profile.ticket_count, 0);
    }

    #[tokio::test]
    async fn test_update_profile_rejects_taken_email() {
        let harness = test_harness();
        let service = UserService::new(&harness.ctx);

        seed_user(&harness.db, "taken@example.com");
        let user = seed_user(&harness.db, "a@example.com");

        let err = service
            .update_profile(
                user.id,
                UpdateProfileRequest {
                    first_name: None,
                    last_name: None,
                    email: Some("taken@example.com".to_string()),
                    phone: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "EMAIL_IN_USE");
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_update_profile_applies_partial_changes() {
        let harness = test_harness();
        let service = UserService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let updated = service
            .update_profile(
                user.id,
                UpdateProfileRequest {
                    first_name: Some("Aysel".to_string()),
                    last_name: None,
                    email: None,
                    phone: Some("+994501234567".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name.as_deref(), Some("Aysel"));
        assert_eq!(updated.email.as_deref(), Some("a@example.com"));
        assert_eq!(updated.phone.as_deref(), Some("+994501234567"));
    }
}
