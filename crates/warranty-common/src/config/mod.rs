//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JobsConfig,
    JwtConfig, OtpConfig, RateLimitConfig, RedisConfig, RegistrationPolicy, SecurityConfig,
    ServerConfig, SmtpConfig, StorageConfig, TicketPolicy,
};
