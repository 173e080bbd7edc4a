//! Transaction ledger
//!
//! Stores pending transactions in proposal order together with the id
//! sequence. Settled transactions are deleted outright; only the event
//! log remembers them.

use crate::crypto::AccountId;
use crate::multisig::error::{MultisigError, MultisigResult};
use crate::multisig::transaction::{PendingTx, Transaction, TxId, Vote};
use serde::{Deserialize, Serialize};

/// Maximum number of simultaneously pending transactions
pub const MAX_TRANSACTIONS: usize = 10;

/// Pending transactions and the id sequence
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransactionLedger {
    /// Next id to allocate
    next_tx_id: TxId,
    /// Pending transactions, ordered by id
    pending: Vec<PendingTx>,
}

impl TransactionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            next_tx_id: 0,
            pending: Vec::new(),
        }
    }

    /// Store a new proposal and return its id
    ///
    /// The proposer's approval is recorded with it.
    pub fn insert(
        &mut self,
        proposer: AccountId,
        tx: Transaction,
        capacity: usize,
    ) -> MultisigResult<TxId> {
        if self.pending.len() >= capacity {
            return Err(MultisigError::MaxTransactionsReached);
        }

        let tx_id = self.next_tx_id;
        self.next_tx_id = tx_id.checked_add(1).ok_or(MultisigError::TxIdOverflow)?;

        self.pending.push(PendingTx::new(tx_id, proposer, tx));
        Ok(tx_id)
    }

    pub fn next_tx_id(&self) -> TxId {
        self.next_tx_id
    }

    /// Ids of all pending transactions
    pub fn active_ids(&self) -> Vec<TxId> {
        self.pending.iter().map(|p| p.id).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn contains(&self, tx_id: TxId) -> bool {
        self.get(tx_id).is_some()
    }

    pub fn get(&self, tx_id: TxId) -> Option<&PendingTx> {
        self.pending.iter().find(|p| p.id == tx_id)
    }

    pub fn get_mut(&mut self, tx_id: TxId) -> Option<&mut PendingTx> {
        self.pending.iter_mut().find(|p| p.id == tx_id)
    }

    pub fn transaction(&self, tx_id: TxId) -> Option<&Transaction> {
        self.get(tx_id).map(|p| &p.tx)
    }

    pub fn approvals(&self, tx_id: TxId) -> Option<u8> {
        self.get(tx_id).map(PendingTx::approvals)
    }

    pub fn rejections(&self, tx_id: TxId) -> Option<u8> {
        self.get(tx_id).map(PendingTx::rejections)
    }

    pub fn vote_of(&self, tx_id: TxId, owner: &AccountId) -> Option<Vote> {
        self.get(tx_id).map(|p| p.vote_of(owner))
    }

    /// All pending transactions in proposal order
    pub fn iter(&self) -> impl Iterator<Item = &PendingTx> {
        self.pending.iter()
    }

    /// Delete a transaction and its votes
    pub fn remove(&mut self, tx_id: TxId) -> Option<PendingTx> {
        let index = self.pending.iter().position(|p| p.id == tx_id)?;
        Some(self.pending.remove(index))
    }
}
