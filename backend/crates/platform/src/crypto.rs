//! Randomness and digests

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// `len` bytes from the OS CSPRNG
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Lowercase hex SHA-256, used for content-addressed upload names
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(sha256_hex(b"hello").len(), 64);
    }

    #[test]
    fn test_random_bytes_differ() {
        let a = random_bytes(32);
        assert_eq!(a.len(), 32);
        assert_ne!(a, random_bytes(32));
    }
}
