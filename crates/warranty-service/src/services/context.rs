//! Service context - dependency container for services
//!
//! Holds the repositories, cache stores, collaborator ports, and policy
//! settings the workflow services run against. Constructed once by the
//! process entry point and shared behind the application state.

use std::sync::Arc;

use warranty_cache::{OtpStore, ResetTokenStore};
use warranty_common::auth::JwtService;
use warranty_common::{RegistrationPolicy, TicketPolicy};
use warranty_core::traits::{
    CatalogRepository, FileStore, Notifier, RefreshTokenRepository, RegistrationRepository,
    TicketRepository, UserRepository, WarrantyRepository,
};

/// Policy settings the services consult
#[derive(Debug, Clone)]
pub struct ServicePolicies {
    pub registration: RegistrationPolicy,
    pub ticket: TicketPolicy,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl: i64,
    /// Base URL of the customer frontend, used in email links
    pub frontend_url: String,
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    user_repo: Arc<dyn UserRepository>,
    catalog_repo: Arc<dyn CatalogRepository>,
    registration_repo: Arc<dyn RegistrationRepository>,
    warranty_repo: Arc<dyn WarrantyRepository>,
    ticket_repo: Arc<dyn TicketRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,

    otp_store: OtpStore,
    reset_store: ResetTokenStore,

    jwt_service: Arc<JwtService>,
    notifier: Arc<dyn Notifier>,
    file_store: Arc<dyn FileStore>,

    policies: ServicePolicies,
}

impl ServiceContext {
    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the catalog repository
    pub fn catalog_repo(&self) -> &dyn CatalogRepository {
        self.catalog_repo.as_ref()
    }

    /// Get the registration repository
    pub fn registration_repo(&self) -> &dyn RegistrationRepository {
        self.registration_repo.as_ref()
    }

    /// Get the warranty repository
    pub fn warranty_repo(&self) -> &dyn WarrantyRepository {
        self.warranty_repo.as_ref()
    }

    /// Get the ticket repository
    pub fn ticket_repo(&self) -> &dyn TicketRepository {
        self.ticket_repo.as_ref()
    }

    /// Get the refresh token repository
    pub fn refresh_token_repo(&self) -> &dyn RefreshTokenRepository {
        self.refresh_token_repo.as_ref()
    }

    /// Get the one-time code store
    pub fn otp_store(&self) -> &OtpStore {
        &self.otp_store
    }

    /// Get the password-reset token store
    pub fn reset_store(&self) -> &ResetTokenStore {
        &self.reset_store
    }

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Get the notification transport
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Get the file store
    pub fn file_store(&self) -> &dyn FileStore {
        self.file_store.as_ref()
    }

    /// Get the policy settings
    pub fn policies(&self) -> &ServicePolicies {
        &self.policies
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("stores", &"...")
            .field("policies", &self.policies)
            .finish()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    catalog_repo: Option<Arc<dyn CatalogRepository>>,
    registration_repo: Option<Arc<dyn RegistrationRepository>>,
    warranty_repo: Option<Arc<dyn WarrantyRepository>>,
    ticket_repo: Option<Arc<dyn TicketRepository>>,
    refresh_token_repo: Option<Arc<dyn RefreshTokenRepository>>,
    otp_store: Option<OtpStore>,
    reset_store: Option<ResetTokenStore>,
    jwt_service: Option<Arc<JwtService>>,
    notifier: Option<Arc<dyn Notifier>>,
    file_store: Option<Arc<dyn FileStore>>,
    policies: Option<ServicePolicies>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn catalog_repo(mut self, repo: Arc<dyn CatalogRepository>) -> Self {
        self.catalog_repo = Some(repo);
        self
    }

    pub fn registration_repo(mut self, repo: Arc<dyn RegistrationRepository>) -> Self {
        self.registration_repo = Some(repo);
        self
    }

    pub fn warranty_repo(mut self, repo: Arc<dyn WarrantyRepository>) -> Self {
        self.warranty_repo = Some(repo);
        self
    }

    pub fn ticket_repo(mut self, repo: Arc<dyn TicketRepository>) -> Self {
        self.ticket_repo = Some(repo);
        self
    }

    pub fn refresh_token_repo(mut self, repo: Arc<dyn RefreshTokenRepository>) -> Self {
        self.refresh_token_repo = Some(repo);
        self
    }

    pub fn otp_store(mut self, store: OtpStore) -> Self {
        self.otp_store = Some(store);
        self
    }

    pub fn reset_store(mut self, store: ResetTokenStore) -> Self {
        self.reset_store = Some(store);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn file_store(mut self, store: Arc<dyn FileStore>) -> Self {
        self.file_store = Some(store);
        self
    }

    pub fn policies(mut self, policies: ServicePolicies) -> Self {
        self.policies = Some(policies);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        use super::error::ServiceError;

        Ok(ServiceContext {
            user_repo: self
                .user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            catalog_repo: self
                .catalog_repo
                .ok_or_else(|| ServiceError::validation("catalog_repo is required"))?,
            registration_repo: self
                .registration_repo
                .ok_or_else(|| ServiceError::validation("registration_repo is required"))?,
            warranty_repo: self
                .warranty_repo
                .ok_or_else(|| ServiceError::validation("warranty_repo is required"))?,
            ticket_repo: self
                .ticket_repo
                .ok_or_else(|| ServiceError::validation("ticket_repo is required"))?,
            refresh_token_repo: self
                .refresh_token_repo
                .ok_or_else(|| ServiceError::validation("refresh_token_repo is required"))?,
            otp_store: self
                .otp_store
                .ok_or_else(|| ServiceError::validation("otp_store is required"))?,
            reset_store: self
                .reset_store
                .ok_or_else(|| ServiceError::validation("reset_store is required"))?,
            jwt_service: self
                .jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            notifier: self
                .notifier
                .ok_or_else(|| ServiceError::validation("notifier is required"))?,
            file_store: self
                .file_store
                .ok_or_else(|| ServiceError::validation("file_store is required"))?,
            policies: self
                .policies
                .ok_or_else(|| ServiceError::validation("policies are required"))?,
        })
    }
}
