//! Content hashing for duplicate-evidence detection
//!
//! Deterministic SHA-256 digest over file bytes; identical content always
//! produces the same hex string.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of the given bytes
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable() {
        let a = sha256_hex(b"invoice bytes");
        let b = sha256_hex(b"invoice bytes");
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_content_differs() {
        assert_ne!(sha256_hex(b"label.jpg"), sha256_hex(b"invoice.jpg"));
    }

    #[test]
    fn test_known_vector() {
        // SHA-256 of the empty input
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_digest_is_lowercase_hex() {
        let digest = sha256_hex(b"photo");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
