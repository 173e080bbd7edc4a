//! Owner registry
//!
//! The authoritative set of owners and the quorum threshold (M-of-N).
//! Every mutation validates before touching state, so a failed call
//! leaves the registry exactly as it was.

use crate::crypto::AccountId;
use crate::multisig::error::{MultisigError, MultisigResult};
use serde::{Deserialize, Serialize};

/// Maximum number of owners an engine accepts
pub const MAX_OWNERS: usize = 10;

/// Owner set and threshold
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OwnerRegistry {
    /// Owner identities, no duplicates
    owners: Vec<AccountId>,
    /// Minimum approvals required (M in M-of-N)
    threshold: u8,
}

impl OwnerRegistry {
    /// Create a registry from the constructor inputs
    ///
    /// Duplicate owners are collapsed before validation.
    ///
    /// # Errors
    /// Returns error if the owners are empty or too many, or the threshold is
    /// zero or greater than the owner count
    pub fn new(
        threshold: u8,
        mut owners: Vec<AccountId>,
        max_owners: usize,
    ) -> MultisigResult<Self> {
        owners.sort_unstable();
        owners.dedup();

        ensure_creation_params(threshold, &owners, max_owners)?;

        Ok(Self { owners, threshold })
    }

    /// A lone owner with threshold 1
    pub fn single(owner: AccountId) -> Self {
        Self {
            owners: vec![owner],
            threshold: 1,
        }
    }

    /// Get the owners in registry order
    pub fn owners(&self) -> &[AccountId] {
        &self.owners
    }

    /// Get the threshold (M)
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Get the owner count (N)
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    pub fn is_owner(&self, account: &AccountId) -> bool {
        self.owners.contains(account)
    }

    pub fn ensure_is_owner(&self, account: &AccountId) -> MultisigResult<()> {
        self.is_owner(account)
            .then_some(())
            .ok_or(MultisigError::NotOwner)
    }

    /// Add a new owner
    ///
    /// A full registry reports `MaxOwnersReached` even for an existing owner.
    pub fn add_owner(&mut self, owner: AccountId, max_owners: usize) -> MultisigResult<()> {
        let already_owner = self.is_owner(&owner);

        let mut owners = self.owners.clone();
        owners.push(owner);
        ensure_creation_params(self.threshold, &owners, max_owners)?;

        if already_owner {
            return Err(MultisigError::OwnerAlreadyExists);
        }

        self.owners = owners;
        Ok(())
    }

    /// Remove an existing owner
    ///
    /// Votes the owner already cast on pending transactions are not touched.
    pub fn remove_owner(&mut self, owner: &AccountId) -> MultisigResult<()> {
        self.ensure_is_owner(owner)?;

        let owners: Vec<AccountId> = self
            .owners
            .iter()
            .filter(|o| *o != owner)
            .cloned()
            .collect();
        ensure_creation_params(self.threshold, &owners, usize::MAX)?;

        self.owners = owners;
        Ok(())
    }

    /// Change the threshold
    pub fn change_threshold(&mut self, threshold: u8) -> MultisigResult<()> {
        ensure_creation_params(threshold, &self.owners, usize::MAX)?;

        self.threshold = threshold;
        Ok(())
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.threshold, self.owners.len())
    }
}

/// Validate a registry configuration
///
/// Checked at construction and against the would-be state of every
/// mutation.
pub fn ensure_creation_params(
    threshold: u8,
    owners: &[AccountId],
    max_owners: usize,
) -> MultisigResult<()> {
    if owners.is_empty() {
        return Err(MultisigError::OwnersCantBeEmpty);
    }

    if threshold == 0 {
        return Err(MultisigError::ThresholdCantBeZero);
    }

    if usize::from(threshold) > owners.len() {
        return Err(MultisigError::ThresholdGreaterThanOwners);
    }

    if owners.len() > max_owners {
        return Err(MultisigError::MaxOwnersReached);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accounts(names: &[&str]) -> Vec<AccountId> {
        names.iter().map(|n| AccountId::from(*n)).collect()
    }

    fn abc() -> OwnerRegistry {
        OwnerRegistry::new(2, accounts(&["alice", "bob", "charlie"]), MAX_OWNERS).unwrap()
    }

    #[test]
    fn test_registry_creation() {
        let registry = abc();

        assert_eq!(registry.threshold(), 2);
        assert_eq!(registry.owner_count(), 3);
        assert_eq!(registry.description(), "2-of-3");
        assert!(registry.is_owner(&"bob".into()));
        assert!(!registry.is_owner(&"dave".into()));
    }

    #[test]
    fn test_creation_validation() {
        assert_eq!(
            OwnerRegistry::new(1, vec![], MAX_OWNERS),
            Err(MultisigError::OwnersCantBeEmpty)
        );
        assert_eq!(
            OwnerRegistry::new(0, accounts(&["alice"]), MAX_OWNERS),
            Err(MultisigError::ThresholdCantBeZero)
        );
        assert_eq!(
            OwnerRegistry::new(3, accounts(&["alice", "bob"]), MAX_OWNERS),
            Err(MultisigError::ThresholdGreaterThanOwners)
        );

        let eleven: Vec<AccountId> = (0..11).map(|i| AccountId::new(format!("o{}", i))).collect();
        assert_eq!(
            OwnerRegistry::new(2, eleven, MAX_OWNERS),
            Err(MultisigError::MaxOwnersReached)
        );
    }

    #[test]
    fn test_duplicate_owners_collapse() {
        let registry =
            OwnerRegistry::new(2, accounts(&["bob", "alice", "bob"]), MAX_OWNERS).unwrap();

        assert_eq!(registry.owners(), &accounts(&["alice", "bob"])[..]);
    }

    #[test]
    fn test_duplicates_count_once_against_threshold() {
        let result = OwnerRegistry::new(2, accounts(&["alice", "alice"]), MAX_OWNERS);
        assert_eq!(result, Err(MultisigError::ThresholdGreaterThanOwners));
    }

    #[test]
    fn test_add_owner() {
        let mut registry = abc();

        registry.add_owner("dave".into(), MAX_OWNERS).unwrap();
        assert_eq!(registry.owner_count(), 4);

        assert_eq!(
            registry.add_owner("bob".into(), MAX_OWNERS),
            Err(MultisigError::OwnerAlreadyExists)
        );
    }

    #[test]
    fn test_add_owner_at_capacity() {
        let owners: Vec<AccountId> = (0..10).map(|i| AccountId::new(format!("o{}", i))).collect();
        let mut registry = OwnerRegistry::new(2, owners, MAX_OWNERS).unwrap();
        let before = registry.clone();

        assert_eq!(
            registry.add_owner("zeta".into(), MAX_OWNERS),
            Err(MultisigError::MaxOwnersReached)
        );
        assert_eq!(registry, before);

        // Capacity is checked before membership
        assert_eq!(
            registry.add_owner("o3".into(), MAX_OWNERS),
            Err(MultisigError::MaxOwnersReached)
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn test_remove_owner() {
        let mut registry = abc();

        registry.remove_owner(&"charlie".into()).unwrap();
        assert_eq!(registry.owner_count(), 2);
        assert!(!registry.is_owner(&"charlie".into()));

        assert_eq!(
            registry.remove_owner(&"charlie".into()),
            Err(MultisigError::NotOwner)
        );
    }

    #[test]
    fn test_remove_owner_keeps_threshold_reachable() {
        let mut registry =
            OwnerRegistry::new(2, accounts(&["alice", "bob"]), MAX_OWNERS).unwrap();
        let before = registry.clone();

        assert_eq!(
            registry.remove_owner(&"bob".into()),
            Err(MultisigError::ThresholdGreaterThanOwners)
        );
        assert_eq!(registry, before);
    }

    #[test]
    fn test_remove_sole_owner() {
        let mut registry = OwnerRegistry::new(1, accounts(&["alice"]), MAX_OWNERS).unwrap();

        assert_eq!(
            registry.remove_owner(&"alice".into()),
            Err(MultisigError::OwnersCantBeEmpty)
        );
        assert_eq!(registry.owner_count(), 1);
    }

    #[test]
    fn test_change_threshold() {
        let mut registry = abc();

        registry.change_threshold(3).unwrap();
        assert_eq!(registry.threshold(), 3);

        assert_eq!(
            registry.change_threshold(0),
            Err(MultisigError::ThresholdCantBeZero)
        );
        assert_eq!(
            registry.change_threshold(4),
            Err(MultisigError::ThresholdGreaterThanOwners)
        );
        assert_eq!(registry.threshold(), 3);
    }
}
