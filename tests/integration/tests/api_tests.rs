//! API integration tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL, JWT_SECRET
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_status, check_test_env, fixtures::*, helpers::*,
};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

/// Register an account, verify it with the OTP from Redis, and return
/// the opened session
async fn register_and_verify(server: &TestServer) -> (RegisterRequest, AuthResponse) {
    let request = RegisterRequest::unique();
    let response = server.post("/api/v1/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let otp = fetch_otp(&request.email).await.expect("otp in redis");
    let response = server
        .post(
            "/api/v1/auth/verify-otp",
            &VerifyOtpRequest {
                identifier: request.email.clone(),
                otp,
            },
        )
        .await
        .unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();

    (request, auth)
}

/// Register and verify an account, promote it to admin, and login again
/// so the access token carries the admin role
async fn admin_session(server: &TestServer) -> AuthResponse {
    let (request, auth) = register_and_verify(server).await;
    promote_to_admin(auth.user.id).await.unwrap();

    let response = server
        .post("/api/v1/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

/// Multipart registration form with two distinct evidence files
fn registration_form(model_id: uuid::Uuid, source_id: uuid::Uuid, content_tag: &str) -> Form {
    Form::new()
        .text("mattress_model_id", model_id.to_string())
        .text("purchase_source_id", source_id.to_string())
        .text("purchase_date", "2026-07-01")
        .text("received_undamaged", "true")
        .text("info_accurate", "true")
        .part(
            "photos",
            Part::bytes(format!("label bytes {content_tag}").into_bytes())
                .file_name("label.jpg")
                .mime_str("image/jpeg")
                .unwrap(),
        )
        .part(
            "photos",
            Part::bytes(format!("invoice bytes {content_tag}").into_bytes())
                .file_name("invoice.jpg")
                .mime_str("image/jpeg")
                .unwrap(),
        )
}

/// Submit a registration for a fresh, verified user
async fn submit_registration(
    server: &TestServer,
    token: &str,
    content_tag: &str,
) -> RegistrationCreatedResponse {
    let (model_id, source_id) = seed_catalog().await.unwrap();
    let response = server
        .post_multipart_auth(
            "/api/v1/products",
            token,
            registration_form(model_id, source_id, content_tag),
        )
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_register_verify_login_flow() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let (request, auth) = register_and_verify(&server).await;

    assert!(auth.user.is_verified);
    assert_eq!(auth.user.role, "CUSTOMER");
    assert_eq!(auth.token_type, "Bearer");
    assert!(!auth.access_token.is_empty());

    // Verified account can now login
    let response = server
        .post("/api/v1/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let login: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(login.user.email, Some(request.email));
}

#[tokio::test]
async fn test_register_duplicate_identifier_conflicts() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::unique();

    server.post("/api/v1/auth/register", &request).await.unwrap();
    let response = server.post("/api/v1/auth/register", &request).await.unwrap();
    assert_status(response, StatusCode::CONFLICT).await.unwrap();
}

#[tokio::test]
async fn test_login_before_verification_is_blocked() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &request).await.unwrap();

    let response = server
        .post("/api/v1/auth/login", &LoginRequest::from_register(&request))
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error.code, "ACCOUNT_NOT_VERIFIED");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let response = server
        .post(
            "/api/v1/auth/login",
            &LoginRequest {
                identifier: "nobody@example.com".to_string(),
                password: "WrongPass1".to_string(),
            },
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_otp_attempt_cap_blocks_fourth_attempt() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let request = RegisterRequest::unique();
    server.post("/api/v1/auth/register", &request).await.unwrap();

    let otp = fetch_otp(&request.email).await.unwrap();

    // Three wrong attempts burn the budget
    for _ in 0..3 {
        let response = server
            .post(
                "/api/v1/auth/verify-otp",
                &VerifyOtpRequest {
                    identifier: request.email.clone(),
                    otp: "000000".to_string(),
                },
            )
            .await
            .unwrap();
        let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
        assert_eq!(body.error.code, "OTP_INVALID");
    }

    // The correct code no longer verifies
    let response = server
        .post(
            "/api/v1/auth/verify-otp",
            &VerifyOtpRequest {
                identifier: request.email.clone(),
                otp,
            },
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "OTP_ATTEMPTS_EXCEEDED");
}

#[tokio::test]
async fn test_refresh_rotates_and_rejects_replay() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let (_, _auth) = register_and_verify(&server).await;

    // The verify-otp response set the refresh cookie in the client's jar;
    // the first refresh rotates it
    let response = server.post_empty("/api/v1/auth/refresh").await.unwrap();
    let old_cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let rotated: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!rotated.access_token.is_empty());

    // The jar now holds the rotated token, so refreshing again succeeds
    let response = server.post_empty("/api/v1/auth/refresh").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    // Replaying the earlier (rotated-away) cookie fails
    let old_cookie = old_cookie.expect("rotation set a cookie");
    let old_pair = old_cookie.split(';').next().unwrap().to_string();
    let bare = reqwest::Client::new();
    let response = bare
        .post(format!("{}/api/v1/auth/refresh", server.base_url()))
        .header("Cookie", old_pair)
        .send()
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_refresh_without_cookie_is_unauthorized() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let response = server.post_empty("/api/v1/auth/refresh").await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Product registration & warranty
// ============================================================================

#[tokio::test]
async fn test_submit_registration_and_approve_activates_warranty() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let (_, customer) = register_and_verify(&server).await;

    let created = submit_registration(
        &server,
        &customer.access_token,
        &uuid::Uuid::new_v4().to_string(),
    )
    .await;
    assert_eq!(created.status, "PENDING_REVIEW");

    // Promote a second account to admin and approve the registration
    let admin_login = admin_session(&server).await;

    let response = server
        .patch_auth(
            &format!("/api/v1/admin/registrations/{}/status", created.registration_id),
            &admin_login.access_token,
            &serde_json::json!({ "status": "APPROVED" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    // The customer's warranty is now active
    let response = server
        .get_auth(
            &format!("/api/v1/products/{}/warranty", created.registration_id),
            &customer.access_token,
        )
        .await
        .unwrap();
    let warranty: WarrantyResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(warranty.status, "ACTIVE");
    assert_eq!(warranty.warranty_months, 120);
    assert!(warranty.days_remaining > 0);
}

#[tokio::test]
async fn test_registration_requires_authentication() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let response = server
        .client
        .post(format!("{}/api/v1/products", server.base_url()))
        .multipart(Form::new().text("purchase_date", "2026-07-01"))
        .send()
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

#[tokio::test]
async fn test_admin_routes_reject_customers() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let (_, customer) = register_and_verify(&server).await;

    let response = server
        .get_auth("/api/v1/admin/registrations", &customer.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_duplicate_evidence_is_reported_not_blocked() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let tag = uuid::Uuid::new_v4().to_string();

    // Two customers upload byte-identical evidence; both succeed
    let (_, first) = register_and_verify(&server).await;
    let first_created = submit_registration(&server, &first.access_token, &tag).await;

    let (_, second) = register_and_verify(&server).await;
    let second_created = submit_registration(&server, &second.access_token, &tag).await;

    // The duplicates report lists the shared hash across both
    let admin = admin_session(&server).await;

    let response = server
        .get_auth("/api/v1/admin/duplicates", &admin.access_token)
        .await
        .unwrap();
    let report: Vec<DuplicateGroupResponse> =
        assert_json(response, StatusCode::OK).await.unwrap();

    let group = report
        .iter()
        .find(|g| {
            g.registration_ids.contains(&first_created.registration_id)
                && g.registration_ids.contains(&second_created.registration_id)
        })
        .expect("shared hash reported");
    assert_eq!(group.registration_count, 2);
    assert!(!group.hash.is_empty());
}

// ============================================================================
// Support tickets
// ============================================================================

#[tokio::test]
async fn test_ticket_requires_a_registered_product() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let (_, customer) = register_and_verify(&server).await;

    let response = server
        .post_auth(
            "/api/v1/support/tickets",
            &customer.access_token,
            &CreateTicketRequest::sample(),
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body.error.code, "NO_REGISTERED_PRODUCT");
}

#[tokio::test]
async fn test_ticket_lifecycle_open_to_in_progress() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let (_, customer) = register_and_verify(&server).await;
    submit_registration(
        &server,
        &customer.access_token,
        &uuid::Uuid::new_v4().to_string(),
    )
    .await;

    // With a registered product, ticket creation succeeds
    let response = server
        .post_auth(
            "/api/v1/support/tickets",
            &customer.access_token,
            &CreateTicketRequest::sample(),
        )
        .await
        .unwrap();
    let created: TicketCreatedResponse =
        assert_json(response, StatusCode::CREATED).await.unwrap();

    // Admin reply advances the open ticket
    let admin = admin_session(&server).await;

    let response = server
        .post_auth(
            &format!("/api/v1/admin/tickets/{}/messages", created.ticket_id),
            &admin.access_token,
            &serde_json::json!({ "body": "We are looking into this." }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .get_auth(
            &format!("/api/v1/support/tickets/{}", created.ticket_id),
            &customer.access_token,
        )
        .await
        .unwrap();
    let detail: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(detail["status"], "IN_PROGRESS");
    assert_eq!(detail["messages"].as_array().unwrap().len(), 2);
}
