//! Password-reset token storage

mod store;

pub use store::{generate_reset_token, ResetTokenStore};
