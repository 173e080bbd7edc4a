//! Account identifiers and address derivation
//!
//! Accounts are opaque, comparable identifiers. Engine instances get a
//! P2SH-style Base58Check address derived from their configuration, stub
//! contracts get a hex address derived from deployer and nonce.

use crate::crypto::hash::{double_sha256, sha256, sha256_hex};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Version byte for engine addresses (produces addresses starting with '3')
const MULTISIG_VERSION: u8 = 0x05;

/// An opaque account identifier
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl FromStr for AccountId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().to_string()))
    }
}

/// Derive the address of an engine instance
///
/// Address = Base58Check(version || RIPEMD160(SHA256(threshold || sorted_owners || salt)))
///
/// Owners are sorted and deduplicated. Each owner and the salt are written
/// with a big-endian `u32` length prefix.
pub fn multisig_address(threshold: u8, owners: &[AccountId], salt: &[u8]) -> AccountId {
    let mut sorted_owners: Vec<&AccountId> = owners.iter().collect();
    sorted_owners.sort();
    sorted_owners.dedup();

    let mut script_data = vec![threshold];
    for owner in sorted_owners {
        push_with_len(&mut script_data, owner.as_str().as_bytes());
    }
    push_with_len(&mut script_data, salt);

    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(&script_data));
    let ripemd_hash = ripemd.finalize();

    let mut address_bytes = vec![MULTISIG_VERSION];
    address_bytes.extend_from_slice(&ripemd_hash);

    let checksum = double_sha256(&address_bytes);
    address_bytes.extend_from_slice(&checksum[..4]);

    AccountId(bs58::encode(address_bytes).into_string())
}

fn push_with_len(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}

/// Derive a contract address from deployer and nonce
pub fn contract_address(deployer: &AccountId, nonce: u64) -> AccountId {
    let input = format!("{}:{}", deployer, nonce);
    let hex = sha256_hex(input.as_bytes());
    AccountId(format!("0x{}", &hex[..40]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owners() -> Vec<AccountId> {
        vec!["alice".into(), "bob".into(), "charlie".into()]
    }

    #[test]
    fn test_multisig_address_prefix() {
        let address = multisig_address(2, &owners(), b"salt");
        assert!(address.as_str().starts_with('3'));
    }

    #[test]
    fn test_multisig_address_ignores_owner_order() {
        let mut reversed = owners();
        reversed.reverse();

        assert_eq!(
            multisig_address(2, &owners(), b"salt"),
            multisig_address(2, &reversed, b"salt")
        );
    }

    #[test]
    fn test_salt_changes_address() {
        assert_ne!(
            multisig_address(2, &owners(), b"one"),
            multisig_address(2, &owners(), b"two")
        );
    }

    #[test]
    fn test_owner_boundaries_change_address() {
        assert_ne!(
            multisig_address(1, &["a".into(), "bc".into()], b""),
            multisig_address(1, &["ab".into(), "c".into()], b"")
        );
        assert_ne!(
            multisig_address(1, &["alice".into()], b"x"),
            multisig_address(1, &["alicex".into()], b"")
        );
    }

    #[test]
    fn test_duplicate_owners_collapse() {
        let doubled = vec!["bob".into(), "alice".into(), "bob".into()];

        assert_eq!(
            multisig_address(1, &doubled, b"salt"),
            multisig_address(1, &["alice".into(), "bob".into()], b"salt")
        );
    }

    #[test]
    fn test_contract_address() {
        let deployer = AccountId::from("deployer");
        let first = contract_address(&deployer, 0);
        let second = contract_address(&deployer, 1);

        assert!(first.as_str().starts_with("0x"));
        assert_eq!(first.as_str().len(), 42);
        assert_ne!(first, second);
    }
}
