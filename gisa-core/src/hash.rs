//! SHA-256 hashing for content addressing of coordinate data.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 hash of in-memory data.
pub fn sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Calculate the SHA-256 hash of a sequence of floats.
///
/// Values are fed in little-endian byte order, so the digest is identical on
/// every platform for bit-identical input.
pub fn sha256_f64(values: impl IntoIterator<Item = f64>) -> String {
    let mut hasher = Sha256::new();
    for v in values {
        hasher.update(v.to_le_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let hash = sha256(b"hello world");
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_sha256_empty() {
        let hash = sha256(b"");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_f64_matches_byte_digest() {
        let values = [1.0f64, -2.5, 3.25];
        let mut bytes = Vec::new();
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        assert_eq!(sha256_f64(values), sha256(&bytes));
    }

    #[test]
    fn test_sha256_f64_sensitive_to_sign_of_zero() {
        assert_ne!(sha256_f64([0.0]), sha256_f64([-0.0]));
    }
}
