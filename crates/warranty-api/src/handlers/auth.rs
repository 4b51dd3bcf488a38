//! Authentication handlers
//!
//! Registration, OTP verification, login, refresh rotation, logout, and
//! the password-reset endpoints. The refresh token only ever travels in
//! an HTTP-only, Secure, SameSite=Strict cookie.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use warranty_service::services::auth::FORGOT_PASSWORD_MESSAGE;
use warranty_service::{
    AuthResponse, AuthService, ForgotPasswordRequest, IssuedSession, LoginRequest,
    MessageResponse, RegisterRequest, RegisteredResponse, ResetPasswordRequest,
    VerifyOtpRequest,
};

use crate::extractors::ValidatedJson;
use crate::response::{ApiError, ApiResult, Created, NoContent};
use crate::state::AppState;

/// Cookie carrying the opaque refresh token
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Build the refresh cookie for an issued session
fn refresh_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(REFRESH_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_secure(state.config().app.env.is_production());
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(
        state.config().security.refresh_token_ttl,
    ));
    cookie
}

/// Expired cookie that clears the refresh token on the client
fn clear_refresh_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(REFRESH_COOKIE, "");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

/// Attach the session's refresh cookie and return its body
fn session_response(
    state: &AppState,
    jar: CookieJar,
    session: IssuedSession,
) -> (CookieJar, Json<AuthResponse>) {
    let jar = jar.add(refresh_cookie(state, session.refresh_token));
    (jar, Json(session.auth))
}

/// Register a new account
///
/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<Created<Json<RegisteredResponse>>> {
    let service = AuthService::new(state.service_context());
    let response = service.register(request).await?;
    Ok(Created(Json(response)))
}

/// Verify a one-time code and open a session
///
/// POST /auth/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<VerifyOtpRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let service = AuthService::new(state.service_context());
    let session = service.verify_otp(request).await?;
    Ok(session_response(&state, jar, session))
}

/// Login with an identifier and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let service = AuthService::new(state.service_context());
    let session = service.login(request).await?;
    Ok(session_response(&state, jar, session))
}

/// Rotate the refresh token and issue a new access token
///
/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(ApiError::MissingAuth)?;

    let service = AuthService::new(state.service_context());
    let session = service.refresh(&token).await?;
    Ok(session_response(&state, jar, session))
}

/// Logout: revoke the refresh token and clear its cookie
///
/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, NoContent)> {
    let token = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());

    let service = AuthService::new(state.service_context());
    service.logout(token.as_deref()).await?;

    Ok((jar.add(clear_refresh_cookie()), NoContent))
}

/// Start a password reset
///
/// POST /auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AuthService::new(state.service_context());
    service.forgot_password(request).await?;
    Ok(Json(MessageResponse::new(FORGOT_PASSWORD_MESSAGE)))
}

/// Complete a password reset
///
/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = AuthService::new(state.service_context());
    service.reset_password(request).await?;
    Ok(Json(MessageResponse::new(
        "Password reset successful. Please log in.",
    )))
}
