//! # warranty-common
//!
//! Shared utilities: configuration, error handling, authentication,
//! content hashing, file storage, notification transports, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod hash;
pub mod notify;
pub mod storage;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    hash_password, validate_password_strength, verify_password, Claims, JwtService,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JobsConfig,
    JwtConfig, OtpConfig, RateLimitConfig, RedisConfig, RegistrationPolicy, SecurityConfig,
    ServerConfig, SmtpConfig, StorageConfig, TicketPolicy,
};
pub use error::{AppError, AppResult};
pub use hash::sha256_hex;
pub use notify::{LogNotifier, SmtpNotifier};
pub use storage::LocalFileStore;
pub use telemetry::{init_telemetry, TelemetryError};
