//! Hashing utilities
//!
//! SHA-256 based helpers used for message selectors, address derivation
//! and Base58Check checksums.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256(&sha256(data))
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// First four bytes of the SHA-256 digest
pub fn short_hash(data: &[u8]) -> [u8; 4] {
    let digest = sha256(data);
    [digest[0], digest[1], digest[2], digest[3]]
}
