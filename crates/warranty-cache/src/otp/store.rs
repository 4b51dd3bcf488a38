//! One-time code storage with attempt capping.
//!
//! Codes live under `otp:{identifier}` and attempt counters under
//! `otp_attempts:{identifier}`, both bounded by the code TTL. The counter
//! is bumped with an atomic increment before the code is read, so
//! concurrent verification attempts for the same identifier cannot slip
//! past the cap.

use std::sync::Arc;

use rand::Rng;
use warranty_core::{KeyValueStore, RepoResult};

/// Key prefix for stored codes
const OTP_PREFIX: &str = "otp:";
/// Key prefix for attempt counters
const OTP_ATTEMPTS_PREFIX: &str = "otp_attempts:";

/// Generate a 6-digit numeric code
#[must_use]
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Outcome of a verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpVerification {
    /// Code matched; code and counter are consumed
    Verified,
    /// Code missing, expired, or wrong; retry allowed up to the cap
    Mismatch,
    /// Attempt cap hit; code and counter invalidated
    AttemptsExceeded,
}

/// Store for one-time codes keyed by login identifier
#[derive(Clone)]
pub struct OtpStore {
    kv: Arc<dyn KeyValueStore>,
    ttl_seconds: u64,
    max_attempts: i64,
}

impl OtpStore {
    /// Create a store with the given code TTL and attempt cap
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, ttl_seconds: u64, max_attempts: i64) -> Self {
        Self {
            kv,
            ttl_seconds,
            max_attempts,
        }
    }

    fn code_key(identifier: &str) -> String {
        format!("{OTP_PREFIX}{identifier}")
    }

    fn attempts_key(identifier: &str) -> String {
        format!("{OTP_ATTEMPTS_PREFIX}{identifier}")
    }

    /// Store a fresh code for an identifier. Any previous attempt counter
    /// is reset so the new code gets the full attempt budget.
    pub async fn store(&self, identifier: &str, otp: &str) -> RepoResult<()> {
        self.kv
            .set_with_expiry(&Self::code_key(identifier), otp, self.ttl_seconds)
            .await?;
        self.kv.delete(&Self::attempts_key(identifier)).await?;

        tracing::debug!(identifier = %mask_identifier(identifier), "OTP stored");
        Ok(())
    }

    /// Verify a submitted code. Counts the attempt first: once the cap is
    /// exceeded the code is invalidated and even a correct submission
    /// fails. A mismatch leaves the code in place for further attempts.
    pub async fn verify(&self, identifier: &str, otp: &str) -> RepoResult<OtpVerification> {
        let attempts_key = Self::attempts_key(identifier);
        let attempts = self.kv.increment(&attempts_key).await?;

        if attempts == 1 {
            // Bound the counter to the same window as the code
            self.kv.expire(&attempts_key, self.ttl_seconds).await?;
        }

        if attempts > self.max_attempts {
            let code_key = Self::code_key(identifier);
            self.kv.delete(&code_key).await?;
            self.kv.delete(&attempts_key).await?;
            tracing::warn!(
                identifier = %mask_identifier(identifier),
                attempts,
                "OTP attempt cap exceeded, code invalidated"
            );
            return Ok(OtpVerification::AttemptsExceeded);
        }

        let code_key = Self::code_key(identifier);
        let stored = self.kv.get(&code_key).await?;

        match stored {
            Some(ref code) if code == otp => {
                self.kv.delete(&code_key).await?;
                self.kv.delete(&attempts_key).await?;
                Ok(OtpVerification::Verified)
            }
            _ => Ok(OtpVerification::Mismatch),
        }
    }
}

impl std::fmt::Debug for OtpStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpStore")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

/// Keep only a short prefix of an identifier for log output
fn mask_identifier(identifier: &str) -> String {
    let visible: String = identifier.chars().take(3).collect();
    format!("{visible}***")
}
