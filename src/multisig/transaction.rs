//! Proposed transactions and their vote state
//!
//! A [`Transaction`] is an outgoing call awaiting quorum. While pending it is
//! wrapped in a [`PendingTx`] that tracks who voted and how.

use crate::crypto::AccountId;
use crate::multisig::error::{MultisigError, MultisigResult};
use crate::multisig::governance::Message;
use crate::runtime::CallFlags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transaction identifier
pub type TxId = u128;

/// Call entry identifier
pub type Selector = [u8; 4];

/// Native asset amount
pub type Balance = u128;

/// An outgoing call to perform once the threshold is reached
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Target account of the call
    pub address: AccountId,
    /// Entry point selector on the target
    pub selector: Selector,
    /// Already encoded call arguments
    pub input: Vec<u8>,
    /// Value moved with the call
    pub transferred_value: Balance,
    /// Gas limit, 0 lets the environment choose
    pub gas_limit: u64,
    /// Whether the callee may call back into the engine
    pub allow_reentry: bool,
}

impl Transaction {
    /// Create a call with no value, default gas and re-entry forbidden
    pub fn new(address: AccountId, selector: Selector, input: Vec<u8>) -> Self {
        Self {
            address,
            selector,
            input,
            transferred_value: 0,
            gas_limit: 0,
            allow_reentry: false,
        }
    }

    /// Build a call into one of an engine's own entry points
    ///
    /// Self-calls re-enter the engine, so re-entry is allowed.
    pub fn self_call(engine: &AccountId, message: &Message) -> MultisigResult<Self> {
        let (selector, input) = message.encode()?;
        Ok(Self::new(engine.clone(), selector, input).with_reentry(true))
    }

    pub fn with_value(mut self, value: Balance) -> Self {
        self.transferred_value = value;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_reentry(mut self, allow_reentry: bool) -> Self {
        self.allow_reentry = allow_reentry;
        self
    }

    /// Flags handed to the execution environment
    pub fn call_flags(&self) -> CallFlags {
        if self.allow_reentry {
            CallFlags::ALLOW_REENTRY
        } else {
            CallFlags::empty()
        }
    }
}

/// Vote state of one owner on one transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vote {
    NotVoted,
    Approved,
    Rejected,
}

/// Outcome of a dispatched transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxResult {
    /// The call completed, carrying the bytes it returned
    Success(Vec<u8>),
    /// The call failed
    Failed(MultisigError),
}

impl TxResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TxResult::Success(_))
    }
}

/// A transaction awaiting votes
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingTx {
    /// Ledger-assigned id
    pub id: TxId,
    /// The call to perform
    pub tx: Transaction,
    /// Owner who proposed it
    pub proposer: AccountId,
    /// Cast votes by owner
    votes: BTreeMap<AccountId, Vote>,
    approvals: u8,
    rejections: u8,
    /// Creation timestamp
    pub proposed_at: DateTime<Utc>,
}

impl PendingTx {
    /// Create a pending transaction carrying the proposer's implicit approval
    pub fn new(id: TxId, proposer: AccountId, tx: Transaction) -> Self {
        let mut votes = BTreeMap::new();
        votes.insert(proposer.clone(), Vote::Approved);

        Self {
            id,
            tx,
            proposer,
            votes,
            approvals: 1,
            rejections: 0,
            proposed_at: Utc::now(),
        }
    }

    pub fn approvals(&self) -> u8 {
        self.approvals
    }

    pub fn rejections(&self) -> u8 {
        self.rejections
    }

    pub fn vote_of(&self, owner: &AccountId) -> Vote {
        self.votes.get(owner).copied().unwrap_or(Vote::NotVoted)
    }

    pub fn has_voted(&self, owner: &AccountId) -> bool {
        self.votes.contains_key(owner)
    }

    /// Owners who have voted, with their vote
    pub fn voters(&self) -> impl Iterator<Item = (&AccountId, Vote)> {
        self.votes.iter().map(|(owner, vote)| (owner, *vote))
    }

    /// Record a vote
    pub fn record(&mut self, owner: AccountId, approve: bool) -> MultisigResult<()> {
        if self.has_voted(&owner) {
            return Err(MultisigError::AlreadyVoted);
        }

        if approve {
            self.approvals = self.approvals.saturating_add(1);
            self.votes.insert(owner, Vote::Approved);
        } else {
            self.rejections = self.rejections.saturating_add(1);
            self.votes.insert(owner, Vote::Rejected);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Transaction {
        Transaction::new("0xtarget".into(), [1, 2, 3, 4], vec![9, 9])
    }

    #[test]
    fn test_transaction_defaults() {
        let tx = sample_tx();

        assert_eq!(tx.transferred_value, 0);
        assert_eq!(tx.gas_limit, 0);
        assert!(!tx.allow_reentry);
        assert_eq!(tx.call_flags(), CallFlags::empty());
    }

    #[test]
    fn test_transaction_builders() {
        let tx = sample_tx()
            .with_value(500)
            .with_gas_limit(20_000)
            .with_reentry(true);

        assert_eq!(tx.transferred_value, 500);
        assert_eq!(tx.gas_limit, 20_000);
        assert!(tx.call_flags().contains(CallFlags::ALLOW_REENTRY));
    }

    #[test]
    fn test_self_call_targets_engine() {
        let engine = AccountId::from("3Engine");
        let message = Message::ChangeThreshold(2);
        let tx = Transaction::self_call(&engine, &message).unwrap();

        assert_eq!(tx.address, engine);
        assert_eq!(tx.selector, message.selector());
        assert!(tx.allow_reentry);
    }

    #[test]
    fn test_pending_tx_implicit_approval() {
        let pending = PendingTx::new(0, "alice".into(), sample_tx());

        assert_eq!(pending.approvals(), 1);
        assert_eq!(pending.rejections(), 0);
        assert_eq!(pending.vote_of(&"alice".into()), Vote::Approved);
        assert_eq!(pending.vote_of(&"bob".into()), Vote::NotVoted);
    }

    #[test]
    fn test_vote_recording() {
        let mut pending = PendingTx::new(0, "alice".into(), sample_tx());

        pending.record("bob".into(), true).unwrap();
        pending.record("charlie".into(), false).unwrap();

        assert_eq!(pending.approvals(), 2);
        assert_eq!(pending.rejections(), 1);
        assert_eq!(pending.vote_of(&"charlie".into()), Vote::Rejected);
        assert_eq!(pending.voters().count(), 3);
    }

    #[test]
    fn test_duplicate_vote_rejected() {
        let mut pending = PendingTx::new(0, "alice".into(), sample_tx());

        assert_eq!(
            pending.record("alice".into(), false),
            Err(MultisigError::AlreadyVoted)
        );
        assert_eq!(pending.rejections(), 0);
    }
}
