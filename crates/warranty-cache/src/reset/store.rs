//! Password-reset token storage.
//!
//! Tokens live under `reset:{token}` mapping to the user id, expiring
//! after the configured TTL. A token is removed once the reset completes.

use std::sync::Arc;

use rand::RngCore;
use uuid::Uuid;
use warranty_core::{KeyValueStore, RepoResult};

/// Key prefix for reset tokens
const RESET_PREFIX: &str = "reset:";

/// Generate an opaque URL-safe reset token (32 random bytes, hex-encoded)
#[must_use]
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Store for outstanding password-reset tokens
#[derive(Clone)]
pub struct ResetTokenStore {
    kv: Arc<dyn KeyValueStore>,
    ttl_seconds: u64,
}

impl ResetTokenStore {
    /// Create a store with the given token TTL
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, ttl_seconds: u64) -> Self {
        Self { kv, ttl_seconds }
    }

    fn key(token: &str) -> String {
        format!("{RESET_PREFIX}{token}")
    }

    /// Store a token for a user
    pub async fn store(&self, token: &str, user_id: Uuid) -> RepoResult<()> {
        self.kv
            .set_with_expiry(&Self::key(token), &user_id.to_string(), self.ttl_seconds)
            .await
    }

    /// Look up the user a token belongs to
    pub async fn get(&self, token: &str) -> RepoResult<Option<Uuid>> {
        let value = self.kv.get(&Self::key(token)).await?;
        Ok(value.and_then(|v| v.parse().ok()))
    }

    /// Remove a token once it has been used
    pub async fn remove(&self, token: &str) -> RepoResult<bool> {
        self.kv.delete(&Self::key(token)).await
    }
}

impl std::fmt::Debug for ResetTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetTokenStore")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_hex() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_generation() {
        assert_eq!(ResetTokenStore::key("abc123"), "reset:abc123");
    }
}
