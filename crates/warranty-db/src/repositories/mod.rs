//! PostgreSQL repository implementations

mod catalog;
mod error;
mod overview;
mod refresh_token;
mod registration;
mod ticket;
mod user;
mod warranty;

pub use catalog::PgCatalogRepository;
pub use refresh_token::PgRefreshTokenRepository;
pub use registration::PgRegistrationRepository;
pub use ticket::PgTicketRepository;
pub use user::PgUserRepository;
pub use warranty::PgWarrantyRepository;
