//! Connection pool management

mod postgres;

pub use postgres::{connect_pool, ping};
pub use sqlx::PgPool;
