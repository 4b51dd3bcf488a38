//! # warranty-cache
//!
//! Redis layer for the transient session stores: one-time codes with
//! attempt capping and password-reset tokens.
//!
//! The pool exposes the expiring key-value primitives
//! (set-with-expiry / get / increment / expire / delete) as the
//! `KeyValueStore` port, and the stores are written against that port so
//! they run the same over Redis and over in-memory fakes in tests.

pub mod otp;
pub mod pool;
pub mod reset;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolError, RedisResult, SharedRedisPool};

// Re-export store types
pub use otp::{generate_otp, OtpStore, OtpVerification};
pub use reset::{generate_reset_token, ResetTokenStore};
