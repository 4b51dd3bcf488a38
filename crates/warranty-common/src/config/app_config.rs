//! Application configuration structs
//!
//! Loads configuration from environment variables.

use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub security: SecurityConfig,
    pub otp: OtpConfig,
    pub smtp: SmtpConfig,
    pub storage: StorageConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub registration: RegistrationPolicy,
    pub ticket: TicketPolicy,
    pub jobs: JobsConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
    /// Base URL of the customer-facing frontend, used in email links
    pub frontend_url: String,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Access-token (JWT) configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds
    pub access_token_expiry: i64,
}

/// Session security configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl: i64,
    /// Password-reset token lifetime in seconds
    pub reset_token_ttl: u64,
}

/// One-time code configuration
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Code lifetime in seconds
    pub ttl_seconds: u64,
    /// Verification attempts allowed within one code's lifetime
    pub max_attempts: i64,
}

/// SMTP transport configuration. An empty host means mail delivery is
/// disabled and notifications are logged instead.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl SmtpConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty()
    }
}

/// File storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub max_file_size_mb: u32,
}

/// Rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Product registration policy
#[derive(Debug, Clone)]
pub struct RegistrationPolicy {
    /// Oldest purchase date accepted, in days before submission
    pub max_purchase_age_days: i64,
    /// Minimum number of evidence files on submission
    pub min_photos: usize,
}

/// Support ticket policy
#[derive(Debug, Clone)]
pub struct TicketPolicy {
    /// Days after resolution during which a customer reply reopens a ticket
    pub reopen_grace_days: i64,
}

/// Background job configuration
#[derive(Debug, Clone)]
pub struct JobsConfig {
    /// Seconds between warranty expiry sweeps
    pub warranty_sweep_interval: u64,
}

// Default value functions
fn default_app_name() -> String {
    "warranty-server".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_refresh_token_ttl() -> i64 {
    604_800 // 7 days
}

fn default_reset_token_ttl() -> u64 {
    3600 // 1 hour
}

fn default_otp_ttl() -> u64 {
    300
}

fn default_otp_max_attempts() -> i64 {
    3
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_from() -> String {
    "KomfyAz <noreply@komfyaz.com>".to_string()
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_max_file_size() -> u32 {
    10
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_max_purchase_age_days() -> i64 {
    365
}

fn default_min_photos() -> usize {
    2
}

fn default_reopen_grace_days() -> i64 {
    30
}

fn default_sweep_interval() -> u64 {
    3600
}

fn env_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
                frontend_url: env::var("FRONTEND_URL").unwrap_or_else(|_| default_frontend_url()),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| default_host()),
                port: env_or("SERVER_PORT", default_port()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", default_max_connections()),
                min_connections: env_or("DATABASE_MIN_CONNECTIONS", default_min_connections()),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL"))?,
                max_connections: env_or("REDIS_MAX_CONNECTIONS", default_redis_max_connections()),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET"))?,
                access_token_expiry: env_or(
                    "JWT_ACCESS_TOKEN_EXPIRY",
                    default_access_token_expiry(),
                ),
            },
            security: SecurityConfig {
                refresh_token_ttl: env_or("REFRESH_TOKEN_TTL", default_refresh_token_ttl()),
                reset_token_ttl: env_or("RESET_TOKEN_TTL", default_reset_token_ttl()),
            },
            otp: OtpConfig {
                ttl_seconds: env_or("OTP_EXPIRY_SECONDS", default_otp_ttl()),
                max_attempts: env_or("OTP_MAX_ATTEMPTS", default_otp_max_attempts()),
            },
            smtp: SmtpConfig {
                host: env::var("SMTP_HOST").unwrap_or_default(),
                port: env_or("SMTP_PORT", default_smtp_port()),
                username: env::var("SMTP_USER").unwrap_or_default(),
                password: env::var("SMTP_PASS").unwrap_or_default(),
                from: env::var("SMTP_FROM").unwrap_or_else(|_| default_smtp_from()),
            },
            storage: StorageConfig {
                upload_dir: env::var("STORAGE_LOCAL_PATH").unwrap_or_else(|_| default_upload_dir()),
                max_file_size_mb: env_or("STORAGE_MAX_FILE_SIZE_MB", default_max_file_size()),
            },
            rate_limit: RateLimitConfig {
                requests_per_second: env_or("RATE_LIMIT_PER_SECOND", default_requests_per_second()),
                burst: env_or("RATE_LIMIT_BURST", default_burst()),
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(|o| o.trim().to_string())
                            .filter(|o| !o.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            registration: RegistrationPolicy {
                max_purchase_age_days: env_or(
                    "REGISTRATION_MAX_PURCHASE_AGE_DAYS",
                    default_max_purchase_age_days(),
                ),
                min_photos: env_or("REGISTRATION_MIN_PHOTOS", default_min_photos()),
            },
            ticket: TicketPolicy {
                reopen_grace_days: env_or("TICKET_REOPEN_GRACE_DAYS", default_reopen_grace_days()),
            },
            jobs: JobsConfig {
                warranty_sweep_interval: env_or(
                    "WARRANTY_SWEEP_INTERVAL_SECONDS",
                    default_sweep_interval(),
                ),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_environment_is_development() {
        assert!(Environment::Development.is_development());
        assert!(!Environment::Production.is_development());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 4000,
        };
        assert_eq!(config.address(), "0.0.0.0:4000");
    }

    #[test]
    fn test_smtp_configured() {
        let mut smtp = SmtpConfig {
            host: String::new(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from: default_smtp_from(),
        };
        assert!(!smtp.is_configured());
        smtp.host = "smtp.example.com".to_string();
        assert!(smtp.is_configured());
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_port(), 4000);
        assert_eq!(default_access_token_expiry(), 900);
        assert_eq!(default_refresh_token_ttl(), 604_800);
        assert_eq!(default_otp_ttl(), 300);
        assert_eq!(default_otp_max_attempts(), 3);
        assert_eq!(default_max_purchase_age_days(), 365);
        assert_eq!(default_min_photos(), 2);
        assert_eq!(default_reopen_grace_days(), 30);
    }
}
