//! Server setup and initialization
//!
//! Builds the application, owns the connection-pool and client
//! lifecycles, and spawns the warranty expiry sweep.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use warranty_cache::{OtpStore, RedisPool, ResetTokenStore};
use warranty_common::{AppConfig, AppError, JwtService, LocalFileStore, LogNotifier, SmtpNotifier};
use warranty_core::traits::{FileStore, KeyValueStore, Notifier};
use warranty_db::{
    connect_pool, PgCatalogRepository, PgRefreshTokenRepository, PgRegistrationRepository,
    PgTicketRepository, PgUserRepository, PgWarrantyRepository,
};
use warranty_service::{ServiceContextBuilder, ServicePolicies, WarrantyService};

use crate::middleware::apply_middleware_with_config;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware.
/// Health probes stay outside the rate-limited stack.
pub fn create_app(state: AppState) -> Router {
    let config = state.config();

    let api = apply_middleware_with_config(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )
    .layer(DefaultBodyLimit::max(
        (config.storage.max_file_size_mb as usize) * 1024 * 1024 * 6,
    ));

    Router::new()
        .merge(health_routes())
        .merge(api)
        .with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    // Create database pool
    info!("Connecting to PostgreSQL...");
    let pool = connect_pool(&config.database)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    // Create Redis pool
    info!("Connecting to Redis...");
    let redis_pool = RedisPool::new(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    let shared_redis = Arc::new(redis_pool);
    info!("Redis connection established");

    // JWT service
    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));

    // Notification transport: SMTP when configured, logging fallback
    // otherwise (development)
    let notifier: Arc<dyn Notifier> = if config.smtp.is_configured() {
        Arc::new(
            SmtpNotifier::new(&config.smtp)
                .map_err(|e| AppError::Config(e.to_string()))?,
        )
    } else {
        info!("SMTP not configured, logging notifications instead");
        Arc::new(LogNotifier::new())
    };

    // File store
    let file_store = LocalFileStore::new(&config.storage.upload_dir);
    file_store
        .ensure_dir()
        .await
        .map_err(|e| AppError::Config(e.to_string()))?;
    let file_store: Arc<dyn FileStore> = Arc::new(file_store);

    // OTP and reset-token stores over the Redis key-value primitives
    let kv: Arc<dyn KeyValueStore> = Arc::new((*shared_redis).clone());
    let otp_store = OtpStore::new(kv.clone(), config.otp.ttl_seconds, config.otp.max_attempts);
    let reset_store = ResetTokenStore::new(kv, config.security.reset_token_ttl);

    // Repositories
    let user_repo = Arc::new(PgUserRepository::new(pool.clone()));
    let catalog_repo = Arc::new(PgCatalogRepository::new(pool.clone()));
    let registration_repo = Arc::new(PgRegistrationRepository::new(pool.clone()));
    let warranty_repo = Arc::new(PgWarrantyRepository::new(pool.clone()));
    let ticket_repo = Arc::new(PgTicketRepository::new(pool.clone()));
    let refresh_token_repo = Arc::new(PgRefreshTokenRepository::new(pool.clone()));

    // Build service context
    let service_context = ServiceContextBuilder::new()
        .user_repo(user_repo)
        .catalog_repo(catalog_repo)
        .registration_repo(registration_repo)
        .warranty_repo(warranty_repo)
        .ticket_repo(ticket_repo)
        .refresh_token_repo(refresh_token_repo)
        .otp_store(otp_store)
        .reset_store(reset_store)
        .jwt_service(jwt_service)
        .notifier(notifier)
        .file_store(file_store)
        .policies(ServicePolicies {
            registration: config.registration.clone(),
            ticket: config.ticket.clone(),
            refresh_token_ttl: config.security.refresh_token_ttl,
            frontend_url: config.app.frontend_url.clone(),
        })
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, config, pool, shared_redis))
}

/// Spawn the periodic warranty expiry sweep. The first sweep runs right
/// away; failures are logged and the loop keeps going.
pub fn spawn_warranty_sweep(state: AppState) {
    let interval_seconds = state.config().jobs.warranty_sweep_interval;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            let service = WarrantyService::new(state.service_context());
            if let Err(e) = service.expire_overdue().await {
                error!(error = %e, "Warranty expiry sweep failed");
            }
        }
    });

    info!(interval_seconds, "Warranty expiry sweep scheduled");
}

/// Run the HTTP server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    let state = create_app_state(config).await?;

    spawn_warranty_sweep(state.clone());

    let app = create_app(state);
    run_server(app, addr).await
}
