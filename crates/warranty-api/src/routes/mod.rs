//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::handlers::{admin, auth, catalog, health, products, profile, support};
use crate::state::AppState;

/// Create the main API router with all routes (health is exported
/// separately so it bypasses rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(catalog_routes())
        .merge(product_routes())
        .merge(profile_routes())
        .merge(support_routes())
        .merge(admin_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/verify-otp", post(auth::verify_otp))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
}

/// Catalog routes
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog/models", get(catalog::list_models))
        .route("/catalog/sources", get(catalog::list_sources))
}

/// Product registration routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(products::register_product))
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product))
        .route("/products/:id/photos", post(products::add_photos))
        .route("/products/:id/warranty", get(products::get_warranty))
}

/// Profile routes
fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile::get_profile))
        .route("/profile", patch(profile::update_profile))
}

/// Support ticket routes (customer side)
fn support_routes() -> Router<AppState> {
    Router::new()
        .route("/support/tickets", post(support::create_ticket))
        .route("/support/tickets", get(support::list_tickets))
        .route("/support/tickets/:id", get(support::get_ticket))
        .route("/support/tickets/:id/messages", post(support::send_message))
}

/// Admin routes
fn admin_routes() -> Router<AppState> {
    Router::new()
        // Registrations & fraud report
        .route("/admin/registrations", get(admin::list_registrations))
        .route("/admin/registrations/:id", get(admin::registration_detail))
        .route(
            "/admin/registrations/:id/status",
            patch(admin::update_registration_status),
        )
        .route("/admin/registrations/:id/notes", post(admin::add_note))
        .route("/admin/duplicates", get(admin::duplicates))
        // Tickets
        .route("/admin/tickets", get(admin::list_tickets))
        .route("/admin/tickets/:id", get(admin::ticket_detail))
        .route("/admin/tickets/:id/messages", post(admin::reply_ticket))
        .route("/admin/tickets/:id/status", patch(admin::update_ticket_status))
        .route("/admin/tickets/:id/tags", patch(admin::update_ticket_tags))
        // Stats & users
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id", get(admin::user_detail))
}
