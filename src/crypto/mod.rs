//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 hashing
//! - Account identifiers and address derivation

pub mod address;
pub mod hash;

pub use address::{contract_address, multisig_address, AccountId};
pub use hash::{double_sha256, sha256, sha256_hex, short_hash};
