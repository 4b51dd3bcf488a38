//! Registration workflow service
//!
//! Submission with duplicate-evidence detection, customer photo
//! additions, and the admin review transition with its warranty and
//! notification side effects.

use chrono::{Duration, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use warranty_common::hash::sha256_hex;
use warranty_common::notify::warranty_confirmation_email;
use warranty_core::traits::{
    NewNote, NewPhoto, NewRegistration, NewWarranty, RegistrationOverview, ReviewUpdate,
    WarrantyTransition,
};
use warranty_core::{
    warranty_end_date, DomainError, PhotoKind, RegistrationStatus,
};

use crate::dto::{
    RegisterProductRequest, RegistrationCreatedResponse, RegistrationResponse,
    UpdateRegistrationStatusRequest, UploadedFile,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Registration workflow service
pub struct RegistrationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RegistrationService<'a> {
    /// Create a new RegistrationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Submit a product registration with its evidence files. Files are
    /// hashed and stored before the transaction; the registration, its
    /// pending warranty, and the photo rows then commit as one unit.
    #[instrument(skip(self, request, files), fields(user_id = %user_id))]
    pub async fn submit(
        &self,
        user_id: Uuid,
        request: RegisterProductRequest,
        files: Vec<UploadedFile>,
    ) -> ServiceResult<RegistrationCreatedResponse> {
        let policy = &self.ctx.policies().registration;

        if files.len() < policy.min_photos {
            return Err(DomainError::NotEnoughPhotos {
                required: policy.min_photos,
            }
            .into());
        }
        if !request.received_undamaged {
            return Err(ServiceError::validation(
                "You must confirm the product was received undamaged",
            ));
        }
        if !request.info_accurate {
            return Err(ServiceError::validation(
                "You must confirm the information is accurate",
            ));
        }

        let model = self
            .ctx
            .catalog_repo()
            .find_model(request.mattress_model_id)
            .await?
            .ok_or(DomainError::ModelNotFound(request.mattress_model_id))?;
        if !model.is_active {
            return Err(DomainError::InactiveModel.into());
        }

        let source = self
            .ctx
            .catalog_repo()
            .find_source(request.purchase_source_id)
            .await?
            .ok_or(DomainError::SourceNotFound(request.purchase_source_id))?;
        if !source.is_active {
            return Err(DomainError::InactiveSource.into());
        }

        let now = Utc::now();
        if request.purchase_date > now {
            return Err(DomainError::PurchaseInFuture.into());
        }
        let max_age = Duration::days(policy.max_purchase_age_days);
        if request.purchase_date < now - max_age {
            return Err(DomainError::PurchaseTooOld {
                max_days: policy.max_purchase_age_days,
            }
            .into());
        }
        if !model.allows_purchase_on(request.purchase_date) {
            return Err(DomainError::PurchaseBeforeRelease.into());
        }

        let registration_id = Uuid::new_v4();
        let photos = self
            .hash_and_store(user_id, &files, PhotoKind::for_upload_index)
            .await?;

        let registration = NewRegistration {
            id: registration_id,
            user_id,
            model_id: model.id,
            source_id: source.id,
            purchase_date: request.purchase_date,
            received_undamaged: request.received_undamaged,
            info_accurate: request.info_accurate,
        };
        let warranty = NewWarranty {
            id: Uuid::new_v4(),
            start_date: request.purchase_date,
            end_date: warranty_end_date(request.purchase_date, model.warranty_months),
        };

        self.ctx
            .registration_repo()
            .create(&registration, &warranty, &photos)
            .await?;

        info!(registration_id = %registration_id, "Product registered");

        Ok(RegistrationCreatedResponse {
            registration_id,
            status: RegistrationStatus::PendingReview,
            message: "Product registered successfully. Your warranty is pending review."
                .to_string(),
        })
    }

    /// All registrations of the requesting customer
    #[instrument(skip(self))]
    pub async fn list_mine(&self, user_id: Uuid) -> ServiceResult<Vec<RegistrationResponse>> {
        let overviews = self.ctx.registration_repo().list_for_user(user_id).await?;
        Ok(overviews.into_iter().map(RegistrationResponse::from).collect())
    }

    /// One registration of the requesting customer
    #[instrument(skip(self))]
    pub async fn get_mine(&self, user_id: Uuid, id: Uuid) -> ServiceResult<RegistrationResponse> {
        let overview = self
            .ctx
            .registration_repo()
            .overview(id)
            .await?
            .filter(|o| o.registration.user_id == user_id)
            .ok_or(DomainError::RegistrationNotFound(id))?;

        Ok(RegistrationResponse::from(overview))
    }

    /// Add evidence photos to an existing registration. Allowed only
    /// while the registration is awaiting review or more information; an
    /// info-requested registration re-queues for review.
    #[instrument(skip(self, files), fields(user_id = %user_id))]
    pub async fn add_photos(
        &self,
        user_id: Uuid,
        id: Uuid,
        files: Vec<UploadedFile>,
    ) -> ServiceResult<()> {
        let registration = self
            .ctx
            .registration_repo()
            .find_owned(id, user_id)
            .await?
            .ok_or(DomainError::RegistrationNotFound(id))?;

        if !registration.status.accepts_photos() {
            return Err(DomainError::PhotosNotAccepted(registration.status).into());
        }
        if files.is_empty() {
            return Err(ServiceError::validation("No files provided"));
        }

        let photos = self
            .hash_and_store(user_id, &files, |_| PhotoKind::Additional)
            .await?;

        let revert = registration.status == RegistrationStatus::InfoRequested;
        self.ctx
            .registration_repo()
            .add_photos(id, &photos, revert)
            .await?;

        if revert {
            info!(registration_id = %id, "Registration re-queued for review");
        }

        Ok(())
    }

    /// Apply an admin review decision. The status change, rejection
    /// reason, warranty flip, and audit note commit as one unit; the
    /// confirmation email goes out only after the commit.
    #[instrument(skip(self, request), fields(admin_id = %admin_id, registration_id = %id))]
    pub async fn review(
        &self,
        admin_id: Uuid,
        id: Uuid,
        request: UpdateRegistrationStatusRequest,
    ) -> ServiceResult<()> {
        if request.status == RegistrationStatus::PendingReview {
            return Err(ServiceError::validation(
                "status must be APPROVED, REJECTED, or INFO_REQUESTED",
            ));
        }

        let overview = self
            .ctx
            .registration_repo()
            .overview(id)
            .await?
            .ok_or(DomainError::RegistrationNotFound(id))?;

        let from = overview.registration.status;
        if !from.can_transition_to(request.status) {
            return Err(DomainError::InvalidStatusTransition {
                from,
                to: request.status,
            }
            .into());
        }

        let warranty_transition = match request.status {
            RegistrationStatus::Approved if overview.warranty.is_some() => {
                Some(WarrantyTransition::Activate {
                    activated_at: Utc::now(),
                })
            }
            RegistrationStatus::Rejected if overview.warranty.is_some() => {
                Some(WarrantyTransition::Void)
            }
            _ => None,
        };

        let rejection_reason = if request.status == RegistrationStatus::Rejected {
            request.reason.clone()
        } else {
            None
        };

        let note = request.reason.as_ref().map(|reason| NewNote {
            id: Uuid::new_v4(),
            admin_id,
            content: format!("Status changed to {}. Reason: {reason}", request.status),
        });

        self.ctx
            .registration_repo()
            .apply_review(
                id,
                &ReviewUpdate {
                    status: request.status,
                    rejection_reason,
                    warranty: warranty_transition,
                    note,
                },
            )
            .await?;

        info!(status = %request.status, "Registration status updated");

        // Deferred side effect: the confirmation email never touches the
        // transaction, and its failure never unwinds the committed review
        if request.status == RegistrationStatus::Approved {
            self.send_confirmation_email(&overview).await;
        }

        Ok(())
    }

    /// Dispatch the warranty-confirmation email when the user has an
    /// email address and the registration carries a warranty.
    async fn send_confirmation_email(&self, overview: &RegistrationOverview) {
        let (Some(email), Some(warranty)) = (overview.user.email.as_deref(), &overview.warranty)
        else {
            return;
        };

        let content = warranty_confirmation_email(
            &overview.model_name,
            &warranty.start_date.format("%Y-%m-%d").to_string(),
            &warranty.end_date.format("%Y-%m-%d").to_string(),
            &self.ctx.policies().frontend_url,
        );

        if let Err(e) = self
            .ctx
            .notifier()
            .send_email(email, &content.subject, &content.html_body)
            .await
        {
            warn!(
                registration_id = %overview.registration.id,
                error = %e,
                "Failed to send warranty confirmation email"
            );
        }
    }

    /// Hash each file, log duplicate-evidence hits, and store the bytes.
    /// `kind_for` assigns the photo kind by upload position.
    async fn hash_and_store(
        &self,
        user_id: Uuid,
        files: &[UploadedFile],
        kind_for: impl Fn(usize) -> PhotoKind,
    ) -> ServiceResult<Vec<NewPhoto>> {
        let mut photos = Vec::with_capacity(files.len());

        for (index, file) in files.iter().enumerate() {
            let hash = sha256_hex(&file.bytes);

            // Fraud signal only: a duplicate hash is surfaced for admin
            // review via the duplicates report, never blocks submission
            let hits = self
                .ctx
                .registration_repo()
                .find_photos_by_hash(&hash)
                .await?;
            if let Some(hit) = hits.first() {
                warn!(
                    user_id = %user_id,
                    hash = %hash,
                    existing_registration_id = %hit.registration_id,
                    "Duplicate photo detected"
                );
            }

            let storage_path = self
                .ctx
                .file_store()
                .store(&file.original_filename, &file.bytes)
                .await?;

            photos.push(NewPhoto {
                id: Uuid::new_v4(),
                kind: kind_for(index),
                original_filename: file.original_filename.clone(),
                storage_path,
                mime_type: file.mime_type.clone(),
                file_size: file.bytes.len() as i64,
                sha256_hash: hash,
            });
        }

        Ok(photos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::admin::AdminService;
    use crate::services::test_support::{
        seed_model, seed_registration, seed_source, seed_user, test_harness, upload_files,
    };
    use chrono::TimeZone;
    use warranty_core::WarrantyStatus;

    fn submit_request(
        model_id: Uuid,
        source_id: Uuid,
        purchase_date: chrono::DateTime<Utc>,
    ) -> RegisterProductRequest {
        RegisterProductRequest {
            mattress_model_id: model_id,
            purchase_source_id: source_id,
            purchase_date,
            received_undamaged: true,
            info_accurate: true,
        }
    }

    #[tokio::test]
    async fn test_submit_creates_pending_registration_with_warranty() {
        let harness = test_harness();
        let service = RegistrationService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let model = seed_model(&harness.db, 120, None);
        let source = seed_source(&harness.db);
        let purchase_date = Utc::now() - Duration::days(30);

        let response = service
            .submit(
                user.id,
                submit_request(model.id, source.id, purchase_date),
                upload_files(),
            )
            .await
            .unwrap();

        assert_eq!(response.status, RegistrationStatus::PendingReview);

        let warranty = harness
            .db
            .warranties
            .lock()
            .unwrap()
            .get(&response.registration_id)
            .cloned()
            .expect("warranty created");
        assert_eq!(warranty.status, WarrantyStatus::Pending);
        assert_eq!(warranty.start_date, purchase_date);
        assert_eq!(warranty.end_date, warranty_end_date(purchase_date, 120));

        let photos = harness.db.photos.lock().unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].kind, PhotoKind::Label);
        assert_eq!(photos[1].kind, PhotoKind::Invoice);
    }

    #[tokio::test]
    async fn test_submit_requires_two_evidence_files() {
        let harness = test_harness();
        let service = RegistrationService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let model = seed_model(&harness.db, 120, None);
        let source = seed_source(&harness.db);

        let mut files = upload_files();
        files.pop();

        let err = service
            .submit(
                user.id,
                submit_request(model.id, source.id, Utc::now() - Duration::days(1)),
                files,
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "NOT_ENOUGH_PHOTOS");
    }

    #[tokio::test]
    async fn test_submit_rejects_purchase_before_release() {
        let harness = test_harness();
        let service = RegistrationService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let released = Utc::now() - Duration::days(100);
        let model = seed_model(&harness.db, 120, Some(released));
        let source = seed_source(&harness.db);

        let err = service
            .submit(
                user.id,
                submit_request(model.id, source.id, released - Duration::days(1)),
                upload_files(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PURCHASE_BEFORE_RELEASE");
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_submit_rejects_future_and_stale_purchases() {
        let harness = test_harness();
        let service = RegistrationService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let model = seed_model(&harness.db, 120, None);
        let source = seed_source(&harness.db);

        let err = service
            .submit(
                user.id,
                submit_request(model.id, source.id, Utc::now() + Duration::days(1)),
                upload_files(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PURCHASE_IN_FUTURE");

        let err = service
            .submit(
                user.id,
                submit_request(model.id, source.id, Utc::now() - Duration::days(400)),
                upload_files(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PURCHASE_TOO_OLD");
    }

    #[tokio::test]
    async fn test_submit_rejects_inactive_model() {
        let harness = test_harness();
        let service = RegistrationService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let model = seed_model(&harness.db, 120, None);
        harness
            .db
            .models
            .lock()
            .unwrap()
            .get_mut(&model.id)
            .unwrap()
            .is_active = false;
        let source = seed_source(&harness.db);

        let err = service
            .submit(
                user.id,
                submit_request(model.id, source.id, Utc::now() - Duration::days(1)),
                upload_files(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INACTIVE_MODEL");
    }

    #[tokio::test]
    async fn test_duplicate_evidence_never_blocks_submission() {
        let harness = test_harness();
        let service = RegistrationService::new(&harness.ctx);

        let model = seed_model(&harness.db, 120, None);
        let source = seed_source(&harness.db);
        let first = seed_user(&harness.db, "first@example.com");
        let second = seed_user(&harness.db, "second@example.com");
        let purchase_date = Utc::now() - Duration::days(5);

        // Both customers upload byte-identical files
        service
            .submit(
                first.id,
                submit_request(model.id, source.id, purchase_date),
                upload_files(),
            )
            .await
            .unwrap();
        service
            .submit(
                second.id,
                submit_request(model.id, source.id, purchase_date),
                upload_files(),
            )
            .await
            .unwrap();

        // The duplicates report surfaces the shared hashes across both
        let report = AdminService::new(&harness.ctx).duplicates().await.unwrap();
        assert!(!report.is_empty());
        assert!(report.iter().all(|g| g.registration_count == 2));
    }

    #[tokio::test]
    async fn test_approval_activates_warranty_and_sends_confirmation() {
        let harness = test_harness();
        let service = RegistrationService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let admin = seed_user(&harness.db, "admin@example.com");
        let model = seed_model(&harness.db, 120, None);
        let source = seed_source(&harness.db);
        let id = seed_registration(
            &harness.db,
            user.id,
            &model,
            &source,
            RegistrationStatus::PendingReview,
        );

        // Pin the warranty window to the known scenario
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        {
            let mut warranties = harness.db.warranties.lock().unwrap();
            let warranty = warranties.get_mut(&id).unwrap();
            warranty.start_date = start;
            warranty.end_date = warranty_end_date(start, 120);
        }

        service
            .review(
                admin.id,
                id,
                UpdateRegistrationStatusRequest {
                    status: RegistrationStatus::Approved,
                    reason: None,
                },
            )
            .await
            .unwrap();

        let warranty = harness.db.warranties.lock().unwrap().get(&id).cloned().unwrap();
        assert_eq!(warranty.status, WarrantyStatus::Active);
        assert!(warranty.activated_at.is_some());
        assert_eq!(
            warranty.end_date,
            Utc.with_ymd_and_hms(2034, 1, 1, 0, 0, 0).unwrap()
        );

        let emails = harness.notifier.emails.lock().unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].0, "a@example.com");
    }

    #[tokio::test]
    async fn test_rejection_voids_warranty_and_records_reason() {
        let harness = test_harness();
        let service = RegistrationService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let admin = seed_user(&harness.db, "admin@example.com");
        let model = seed_model(&harness.db, 120, None);
        let source = seed_source(&harness.db);
        let id = seed_registration(
            &harness.db,
            user.id,
            &model,
            &source,
            RegistrationStatus::PendingReview,
        );

        service
            .review(
                admin.id,
                id,
                UpdateRegistrationStatusRequest {
                    status: RegistrationStatus::Rejected,
                    reason: Some("Invoice unreadable".to_string()),
                },
            )
            .await
            .unwrap();

        let registration = harness
            .db
            .registrations
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap();
        assert_eq!(registration.status, RegistrationStatus::Rejected);
        assert_eq!(
            registration.rejection_reason.as_deref(),
            Some("Invoice unreadable")
        );

        let warranty = harness.db.warranties.lock().unwrap().get(&id).cloned().unwrap();
        assert_eq!(warranty.status, WarrantyStatus::Voided);

        // The transition left an audit note
        let notes = harness.db.notes.lock().unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].content.contains("REJECTED"));

        // No confirmation email for rejections
        assert!(harness.notifier.emails.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_registration_cannot_be_approved() {
        let harness = test_harness();
        let service = RegistrationService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let admin = seed_user(&harness.db, "admin@example.com");
        let model = seed_model(&harness.db, 120, None);
        let source = seed_source(&harness.db);
        let id = seed_registration(
            &harness.db,
            user.id,
            &model,
            &source,
            RegistrationStatus::Rejected,
        );

        let err = service
            .review(
                admin.id,
                id,
                UpdateRegistrationStatusRequest {
                    status: RegistrationStatus::Approved,
                    reason: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATUS_TRANSITION");
    }

    #[tokio::test]
    async fn test_adding_photos_requeues_info_requested_registration() {
        let harness = test_harness();
        let service = RegistrationService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let model = seed_model(&harness.db, 120, None);
        let source = seed_source(&harness.db);
        let id = seed_registration(
            &harness.db,
            user.id,
            &model,
            &source,
            RegistrationStatus::InfoRequested,
        );

        service
            .add_photos(user.id, id, upload_files())
            .await
            .unwrap();

        let registration = harness
            .db
            .registrations
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap();
        assert_eq!(registration.status, RegistrationStatus::PendingReview);
    }

    #[tokio::test]
    async fn test_photos_rejected_after_decision() {
        let harness = test_harness();
        let service = RegistrationService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let model = seed_model(&harness.db, 120, None);
        let source = seed_source(&harness.db);
        let id = seed_registration(
            &harness.db,
            user.id,
            &model,
            &source,
            RegistrationStatus::Approved,
        );

        let err = service
            .add_photos(user.id, id, upload_files())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PHOTOS_NOT_ACCEPTED");
    }

    #[tokio::test]
    async fn test_review_rejects_pending_review_target() {
        let harness = test_harness();
        let service = RegistrationService::new(&harness.ctx);

        let admin = seed_user(&harness.db, "admin@example.com");
        let err = service
            .review(
                admin.id,
                Uuid::new_v4(),
                UpdateRegistrationStatusRequest {
                    status: RegistrationStatus::PendingReview,
                    reason: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
