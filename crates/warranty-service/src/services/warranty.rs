//! Warranty lifecycle service
//!
//! Read-time effective status reporting and the periodic expiry sweep.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use warranty_core::DomainError;

use crate::dto::WarrantyResponse;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Warranty lifecycle service
pub struct WarrantyService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> WarrantyService<'a> {
    /// Create a new WarrantyService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Warranty detail for one of the requesting customer's registrations.
    /// Reports the effective status: a stored-active warranty past its end
    /// date reads as expired even before the sweep has run.
    #[instrument(skip(self))]
    pub async fn get_for_registration(
        &self,
        user_id: Uuid,
        registration_id: Uuid,
    ) -> ServiceResult<WarrantyResponse> {
        let registration = self
            .ctx
            .registration_repo()
            .find_owned(registration_id, user_id)
            .await?;
        if registration.is_none() {
            return Err(ServiceError::Domain(DomainError::RegistrationNotFound(
                registration_id,
            )));
        }

        let summary = self
            .ctx
            .warranty_repo()
            .summary_for_registration(registration_id, user_id)
            .await?
            .ok_or(DomainError::WarrantyNotFound(registration_id))?;

        Ok(WarrantyResponse::at(summary, Utc::now()))
    }

    /// Expiry sweep: flip every stored-active warranty whose end date has
    /// passed to expired. Idempotent; a sweep with nothing to do is a
    /// no-op.
    #[instrument(skip(self))]
    pub async fn expire_overdue(&self) -> ServiceResult<u64> {
        let expired = self.ctx.warranty_repo().expire_overdue(Utc::now()).await?;

        if expired > 0 {
            info!(count = expired, "Expired warranties");
        }

        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{
        seed_model, seed_registration, seed_source, seed_user, test_harness,
    };
    use chrono::Duration;
    use warranty_core::{RegistrationStatus, WarrantyStatus};

    #[tokio::test]
    async fn test_active_warranty_past_end_reads_expired_before_sweep() {
        let harness = test_harness();
        let service = WarrantyService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let model = seed_model(&harness.db, 12, None);
        let source = seed_source(&harness.db);
        let id = seed_registration(
            &harness.db,
            user.id,
            &model,
            &source,
            RegistrationStatus::Approved,
        );
        {
            let mut warranties = harness.db.warranties.lock().unwrap();
            let warranty = warranties.get_mut(&id).unwrap();
            warranty.status = WarrantyStatus::Active;
            warranty.end_date = Utc::now() - Duration::days(1);
        }

        let response = service.get_for_registration(user.id, id).await.unwrap();
        assert_eq!(response.status, WarrantyStatus::Expired);
        assert_eq!(response.days_remaining, 0);
    }

    #[tokio::test]
    async fn test_days_remaining_rounds_partial_days_up() {
        let harness = test_harness();
        let service = WarrantyService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let model = seed_model(&harness.db, 12, None);
        let source = seed_source(&harness.db);
        let id = seed_registration(
            &harness.db,
            user.id,
            &model,
            &source,
            RegistrationStatus::Approved,
        );
        {
            let mut warranties = harness.db.warranties.lock().unwrap();
            let warranty = warranties.get_mut(&id).unwrap();
            warranty.status = WarrantyStatus::Active;
            warranty.end_date = Utc::now() + Duration::hours(30);
        }

        let response = service.get_for_registration(user.id, id).await.unwrap();
        assert_eq!(response.status, WarrantyStatus::Active);
        assert_eq!(response.days_remaining, 2);
    }

    #[tokio::test]
    async fn test_warranty_view_is_owner_scoped() {
        let harness = test_harness();
        let service = WarrantyService::new(&harness.ctx);

        let owner = seed_user(&harness.db, "owner@example.com");
        let other = seed_user(&harness.db, "other@example.com");
        let model = seed_model(&harness.db, 12, None);
        let source = seed_source(&harness.db);
        let id = seed_registration(
            &harness.db,
            owner.id,
            &model,
            &source,
            RegistrationStatus::Approved,
        );

        let err = service.get_for_registration(other.id, id).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_sweep_expires_overdue_and_is_idempotent() {
        let harness = test_harness();
        let service = WarrantyService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let model = seed_model(&harness.db, 12, None);
        let source = seed_source(&harness.db);
        let id = seed_registration(
            &harness.db,
            user.id,
            &model,
            &source,
            RegistrationStatus::Approved,
        );
        {
            let mut warranties = harness.db.warranties.lock().unwrap();
            let warranty = warranties.get_mut(&id).unwrap();
            warranty.status = WarrantyStatus::Active;
            warranty.end_date = Utc::now() - Duration::days(3);
        }

        assert_eq!(service.expire_overdue().await.unwrap(), 1);
        let warranty = harness.db.warranties.lock().unwrap().get(&id).cloned().unwrap();
        assert_eq!(warranty.status, WarrantyStatus::Expired);

        // Nothing left to flip
        assert_eq!(service.expire_overdue().await.unwrap(), 0);
    }
}
