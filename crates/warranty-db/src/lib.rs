//! # warranty-db
//!
//! Database layer implementing the core repository traits with PostgreSQL
//! via SQLx.
//!
//! ## Overview
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ model mappers
//! - Repository implementations; every multi-row workflow mutation
//!   (submission, review, photo additions, ticket create/reply) is a
//!   single SQL transaction

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{connect_pool, ping, PgPool};
pub use repositories::{
    PgCatalogRepository, PgRefreshTokenRepository, PgRegistrationRepository, PgTicketRepository,
    PgUserRepository, PgWarrantyRepository,
};
