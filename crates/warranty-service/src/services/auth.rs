//! Authentication service
//!
//! Account registration, OTP verification, login, refresh-token rotation,
//! logout, and the password-reset flow.

use chrono::{Duration, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use warranty_cache::{generate_otp, generate_reset_token, OtpVerification};
use warranty_common::auth::{hash_password, validate_password_strength, verify_password};
use warranty_common::notify::{otp_email, otp_sms, password_reset_email};
use warranty_common::AppError;
use warranty_core::{DomainError, User};

use crate::dto::{
    AuthResponse, ForgotPasswordRequest, IssuedSession, LoginRequest, RegisterRequest,
    RegisteredResponse, ResetPasswordRequest, UserResponse, VerifyOtpRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// The one message forgot-password ever returns, found or not
pub const FORGOT_PASSWORD_MESSAGE: &str = "If an account exists, a reset link has been sent.";

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new customer account and send a verification code
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<RegisteredResponse> {
        if request.email.is_none() && request.phone.is_none() {
            return Err(DomainError::MissingIdentifier.into());
        }
        if !request.consent {
            return Err(ServiceError::validation(
                "You must consent to data processing",
            ));
        }
        validate_password_strength(&request.password).map_err(ServiceError::from)?;

        if self
            .ctx
            .user_repo()
            .identifier_exists(request.email.as_deref(), request.phone.as_deref())
            .await?
        {
            return Err(DomainError::IdentifierTaken.into());
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| ServiceError::internal(e.to_string()))?;

        let mut user = User::new(Uuid::new_v4(), request.email, request.phone);
        user.first_name = request.first_name;
        user.last_name = request.last_name;

        self.ctx.user_repo().create(&user, &password_hash).await?;

        info!(user_id = %user.id, "User registered");

        self.issue_and_send_otp(&user).await?;

        Ok(RegisteredResponse {
            user_id: user.id,
            message: "Registration successful. Please verify your account with the OTP sent."
                .to_string(),
        })
    }

    /// Verify a one-time code, mark the account verified, and open a session
    #[instrument(skip(self, request), fields(identifier = %request.identifier))]
    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> ServiceResult<IssuedSession> {
        let outcome = self
            .ctx
            .otp_store()
            .verify(&request.identifier, &request.otp)
            .await?;

        match outcome {
            OtpVerification::Verified => {}
            OtpVerification::Mismatch => return Err(DomainError::OtpInvalid.into()),
            OtpVerification::AttemptsExceeded => {
                return Err(DomainError::OtpAttemptsExceeded.into())
            }
        }

        let user = self
            .ctx
            .user_repo()
            .find_by_identifier(&request.identifier)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", request.identifier.clone()))?;

        self.ctx.user_repo().mark_verified(user.id).await?;

        info!(user_id = %user.id, "Account verified");

        let mut verified = user;
        verified.is_verified = true;
        self.issue_session(&verified).await
    }

    /// Login with an identifier and password
    #[instrument(skip(self, request), fields(identifier = %request.identifier))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<IssuedSession> {
        // Unknown identifier and wrong password are the same outcome
        let user = self
            .ctx
            .user_repo()
            .find_by_identifier(&request.identifier)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: unknown identifier");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user.id, "Login failed: no password hash");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        let is_valid = verify_password(&request.password, &password_hash)
            .map_err(|e| ServiceError::internal(e.to_string()))?;
        if !is_valid {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(ServiceError::App(AppError::InvalidCredentials));
        }

        if !user.is_verified {
            // Unverified accounts get a fresh code instead of a session
            self.issue_and_send_otp(&user).await?;
            return Err(ServiceError::App(AppError::AccountNotVerified));
        }

        info!(user_id = %user.id, "User logged in");
        self.issue_session(&user).await
    }

    /// Rotate a refresh token: consume the presented one and issue a new
    /// access/refresh pair. A consumed-but-expired token fails; its row is
    /// already gone.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<IssuedSession> {
        let consumed = self
            .ctx
            .refresh_token_repo()
            .consume(refresh_token)
            .await?
            .ok_or_else(|| {
                warn!("Refresh failed: token not found (possibly already rotated)");
                ServiceError::App(AppError::InvalidToken)
            })?;

        if consumed.expires_at < Utc::now() {
            warn!(user_id = %consumed.user_id, "Refresh failed: token expired");
            return Err(ServiceError::App(AppError::TokenExpired));
        }

        let user = self
            .ctx
            .user_repo()
            .find_by_id(consumed.user_id)
            .await?
            .ok_or_else(|| ServiceError::App(AppError::InvalidToken))?;

        self.issue_session(&user).await
    }

    /// Logout: revoke the presented refresh token, if any
    #[instrument(skip(self, refresh_token))]
    pub async fn logout(&self, refresh_token: Option<&str>) -> ServiceResult<()> {
        if let Some(token) = refresh_token {
            self.ctx.refresh_token_repo().revoke(token).await?;
        }
        Ok(())
    }

    /// Start a password reset. Always reports the same generic outcome so
    /// callers cannot probe which identifiers exist.
    #[instrument(skip(self, request), fields(identifier = %request.identifier))]
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> ServiceResult<()> {
        let user = self
            .ctx
            .user_repo()
            .find_by_identifier(&request.identifier)
            .await?;

        let Some(user) = user else {
            return Ok(());
        };
        let Some(email) = user.email.clone() else {
            return Ok(());
        };

        let token = generate_reset_token();
        self.ctx.reset_store().store(&token, user.id).await?;

        let content = password_reset_email(&token, &self.ctx.policies().frontend_url);
        if let Err(e) = self
            .ctx
            .notifier()
            .send_email(&email, &content.subject, &content.html_body)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Failed to send password reset email");
        }

        Ok(())
    }

    /// Complete a password reset: re-hash, consume the token, and revoke
    /// every refresh token so all sessions must re-authenticate.
    #[instrument(skip(self, request))]
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> ServiceResult<()> {
        let user_id = self
            .ctx
            .reset_store()
            .get(&request.token)
            .await?
            .ok_or_else(|| {
                ServiceError::App(AppError::InvalidInput(
                    "Invalid or expired reset token".to_string(),
                ))
            })?;

        validate_password_strength(&request.password).map_err(ServiceError::from)?;

        let password_hash =
            hash_password(&request.password).map_err(|e| ServiceError::internal(e.to_string()))?;
        self.ctx
            .user_repo()
            .update_password(user_id, &password_hash)
            .await?;

        self.ctx.reset_store().remove(&request.token).await?;

        let revoked = self
            .ctx
            .refresh_token_repo()
            .revoke_all_for_user(user_id)
            .await?;

        info!(user_id = %user_id, revoked, "Password reset, all sessions revoked");
        Ok(())
    }

    /// Generate, store, and dispatch a one-time code for a user. Delivery
    /// failures are logged, never propagated.
    async fn issue_and_send_otp(&self, user: &User) -> ServiceResult<()> {
        let Some(identifier) = user.identifier() else {
            return Err(DomainError::MissingIdentifier.into());
        };

        let otp = generate_otp();
        self.ctx.otp_store().store(identifier, &otp).await?;

        let result = if let Some(email) = user.email.as_deref() {
            let content = otp_email(&otp);
            self.ctx
                .notifier()
                .send_email(email, &content.subject, &content.html_body)
                .await
        } else if let Some(phone) = user.phone.as_deref() {
            self.ctx.notifier().send_sms(phone, &otp_sms(&otp)).await
        } else {
            Ok(())
        };

        if let Err(e) = result {
            warn!(user_id = %user.id, error = %e, "Failed to dispatch OTP");
        }

        Ok(())
    }

    /// Issue an access token plus a fresh opaque refresh token for a user
    async fn issue_session(&self, user: &User) -> ServiceResult<IssuedSession> {
        let access_token = self
            .ctx
            .jwt_service()
            .issue_access_token(user.id, user.role)
            .map_err(|e| ServiceError::internal(e.to_string()))?;

        let refresh_token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::seconds(self.ctx.policies().refresh_token_ttl);
        self.ctx
            .refresh_token_repo()
            .issue(&refresh_token, user.id, expires_at)
            .await?;

        Ok(IssuedSession {
            auth: AuthResponse::new(
                access_token,
                self.ctx.jwt_service().access_token_expiry(),
                UserResponse::from(user),
            ),
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{seed_user, test_harness};

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.to_string()),
            phone: None,
            password: "GoodPass1".to_string(),
            first_name: Some("Test".to_string()),
            last_name: None,
            consent: true,
        }
    }

    async fn stored_otp(harness: &crate::services::test_support::TestHarness, identifier: &str) -> String {
        harness
            .kv
            .data
            .lock()
            .unwrap()
            .get(&format!("otp:{identifier}"))
            .cloned()
            .expect("otp stored")
    }

    #[tokio::test]
    async fn test_register_creates_unverified_user_and_sends_otp() {
        let harness = test_harness();
        let service = AuthService::new(&harness.ctx);

        let response = service.register(register_request("a@example.com")).await.unwrap();

        let users = harness.db.users.lock().unwrap();
        let (user, _) = users.get(&response.user_id).expect("user stored");
        assert!(!user.is_verified);

        drop(users);
        assert!(!stored_otp(&harness, "a@example.com").await.is_empty());
        assert_eq!(harness.notifier.emails.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_requires_email_or_phone() {
        let harness = test_harness();
        let service = AuthService::new(&harness.ctx);

        let mut request = register_request("a@example.com");
        request.email = None;

        let err = service.register(request).await.unwrap_err();
        assert_eq!(err.error_code(), "MISSING_IDENTIFIER");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_identifier() {
        let harness = test_harness();
        let service = AuthService::new(&harness.ctx);

        service.register(register_request("a@example.com")).await.unwrap();
        let err = service
            .register(register_request("a@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_verify_otp_opens_session() {
        let harness = test_harness();
        let service = AuthService::new(&harness.ctx);

        service.register(register_request("a@example.com")).await.unwrap();
        let otp = stored_otp(&harness, "a@example.com").await;

        let session = service
            .verify_otp(VerifyOtpRequest {
                identifier: "a@example.com".to_string(),
                otp,
            })
            .await
            .unwrap();

        assert!(session.auth.user.is_verified);
        assert!(!session.refresh_token.is_empty());
        assert!(harness
            .db
            .refresh_tokens
            .lock()
            .unwrap()
            .contains_key(&session.refresh_token));
    }

    #[tokio::test]
    async fn test_otp_fourth_attempt_fails_even_with_correct_code() {
        let harness = test_harness();
        let service = AuthService::new(&harness.ctx);

        service.register(register_request("a@example.com")).await.unwrap();
        let otp = stored_otp(&harness, "a@example.com").await;

        for _ in 0..3 {
            let err = service
                .verify_otp(VerifyOtpRequest {
                    identifier: "a@example.com".to_string(),
                    otp: "000000".to_string(),
                })
                .await
                .unwrap_err();
            assert_eq!(err.error_code(), "OTP_INVALID");
        }

        let err = service
            .verify_otp(VerifyOtpRequest {
                identifier: "a@example.com".to_string(),
                otp,
            })
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "OTP_ATTEMPTS_EXCEEDED");
    }

    #[tokio::test]
    async fn test_login_hides_which_part_was_wrong() {
        let harness = test_harness();
        let service = AuthService::new(&harness.ctx);

        let hash = hash_password("GoodPass1").unwrap();
        let mut user = User::new(Uuid::new_v4(), Some("a@example.com".to_string()), None);
        user.is_verified = true;
        harness
            .db
            .users
            .lock()
            .unwrap()
            .insert(user.id, (user, hash));

        let unknown = service
            .login(LoginRequest {
                identifier: "nobody@example.com".to_string(),
                password: "GoodPass1".to_string(),
            })
            .await
            .unwrap_err();
        let wrong_password = service
            .login(LoginRequest {
                identifier: "a@example.com".to_string(),
                password: "WrongPass1".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(unknown.error_code(), wrong_password.error_code());
        assert_eq!(unknown.status_code(), 401);
    }

    #[tokio::test]
    async fn test_login_unverified_resends_otp() {
        let harness = test_harness();
        let service = AuthService::new(&harness.ctx);

        let hash = hash_password("GoodPass1").unwrap();
        let user = User::new(Uuid::new_v4(), Some("a@example.com".to_string()), None);
        harness
            .db
            .users
            .lock()
            .unwrap()
            .insert(user.id, (user, hash));

        let err = service
            .login(LoginRequest {
                identifier: "a@example.com".to_string(),
                password: "GoodPass1".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "ACCOUNT_NOT_VERIFIED");
        assert!(!stored_otp(&harness, "a@example.com").await.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_rotation_is_single_use() {
        let harness = test_harness();
        let service = AuthService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let session = service.issue_session(&user).await.unwrap();
        let old_token = session.refresh_token;

        // First rotation succeeds and yields a new token
        let rotated = service.refresh(&old_token).await.unwrap();
        assert_ne!(rotated.refresh_token, old_token);

        // Replaying the rotated-away token fails
        let err = service.refresh(&old_token).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TOKEN");

        // The freshly rotated token works exactly once more
        assert!(service.refresh(&rotated.refresh_token).await.is_ok());
        assert!(service.refresh(&rotated.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_refresh_token_is_consumed_on_failure() {
        let harness = test_harness();
        let service = AuthService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        harness.db.refresh_tokens.lock().unwrap().insert(
            "stale-token".to_string(),
            (user.id, Utc::now() - Duration::days(1)),
        );

        let err = service.refresh("stale-token").await.unwrap_err();
        assert_eq!(err.error_code(), "TOKEN_EXPIRED");
        assert!(!harness
            .db
            .refresh_tokens
            .lock()
            .unwrap()
            .contains_key("stale-token"));
    }

    #[tokio::test]
    async fn test_logout_revokes_presented_token() {
        let harness = test_harness();
        let service = AuthService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let session = service.issue_session(&user).await.unwrap();

        service.logout(Some(&session.refresh_token)).await.unwrap();
        assert!(harness.db.refresh_tokens.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_forgot_password_never_reveals_account_existence() {
        let harness = test_harness();
        let service = AuthService::new(&harness.ctx);

        // Unknown identifier: silent success, nothing sent
        service
            .forgot_password(ForgotPasswordRequest {
                identifier: "nobody@example.com".to_string(),
            })
            .await
            .unwrap();
        assert!(harness.notifier.emails.lock().unwrap().is_empty());

        // Known identifier: same outcome, reset email dispatched
        seed_user(&harness.db, "a@example.com");
        service
            .forgot_password(ForgotPasswordRequest {
                identifier: "a@example.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(harness.notifier.emails.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_password_revokes_all_sessions() {
        let harness = test_harness();
        let service = AuthService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        service.issue_session(&user).await.unwrap();
        service.issue_session(&user).await.unwrap();

        harness.ctx.reset_store().store("tok", user.id).await.unwrap();
        service
            .reset_password(ResetPasswordRequest {
                token: "tok".to_string(),
                password: "NewGoodPass1".to_string(),
            })
            .await
            .unwrap();

        assert!(harness.db.refresh_tokens.lock().unwrap().is_empty());

        // The new password now authenticates
        assert!(service
            .login(LoginRequest {
                identifier: "a@example.com".to_string(),
                password: "NewGoodPass1".to_string(),
            })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_reset_with_unknown_token_fails() {
        let harness = test_harness();
        let service = AuthService::new(&harness.ctx);

        let err = service
            .reset_password(ResetPasswordRequest {
                token: "bogus".to_string(),
                password: "NewGoodPass1".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
