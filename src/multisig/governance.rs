//! Self-governance
//!
//! Owner and threshold changes, and outgoing fund transfers, are entry points
//! that only the engine itself may call. The sole way to reach them is to
//! propose a transaction targeting the engine's own address with one of the
//! [`Message`]s below; when quorum dispatches it, the caller is the engine
//! and the guard passes.
//!
//! Messages are addressed by a 4-byte selector (first bytes of SHA-256 over
//! the snake_case name) and carry their arguments as JSON.

use crate::crypto::{short_hash, AccountId};
use crate::multisig::engine::MultisigEngine;
use crate::multisig::error::{MultisigError, MultisigResult};
use crate::multisig::events::Event;
use crate::multisig::transaction::{Balance, Selector, Transaction, TxId};
use crate::runtime::Environment;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Names of every entry point, in dispatch table order
const MESSAGE_NAMES: [&str; 19] = [
    "propose_tx",
    "approve_tx",
    "reject_tx",
    "try_execute_tx",
    "try_remove_tx",
    "add_owner",
    "remove_owner",
    "change_threshold",
    "transfer",
    "get_owners",
    "is_owner",
    "get_threshold",
    "get_next_tx_id",
    "get_active_txid_list",
    "get_tx",
    "is_tx_valid",
    "get_tx_approvals",
    "get_tx_rejections",
    "get_tx_approval_for_account",
];

/// Selector for an entry point name
pub fn selector_for(name: &str) -> Selector {
    short_hash(name.as_bytes())
}

/// Every entry point of the engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    ProposeTx(Transaction),
    ApproveTx(TxId),
    RejectTx(TxId),
    TryExecuteTx(TxId),
    TryRemoveTx(TxId),
    AddOwner(AccountId),
    RemoveOwner(AccountId),
    ChangeThreshold(u8),
    Transfer { to: AccountId, value: Balance },
    GetOwners,
    IsOwner(AccountId),
    GetThreshold,
    GetNextTxId,
    GetActiveTxidList,
    GetTx(TxId),
    IsTxValid(TxId),
    GetTxApprovals(TxId),
    GetTxRejections(TxId),
    GetTxApprovalForAccount(TxId, AccountId),
}

impl Message {
    /// Entry point name
    pub fn name(&self) -> &'static str {
        match self {
            Message::ProposeTx(_) => "propose_tx",
            Message::ApproveTx(_) => "approve_tx",
            Message::RejectTx(_) => "reject_tx",
            Message::TryExecuteTx(_) => "try_execute_tx",
            Message::TryRemoveTx(_) => "try_remove_tx",
            Message::AddOwner(_) => "add_owner",
            Message::RemoveOwner(_) => "remove_owner",
            Message::ChangeThreshold(_) => "change_threshold",
            Message::Transfer { .. } => "transfer",
            Message::GetOwners => "get_owners",
            Message::IsOwner(_) => "is_owner",
            Message::GetThreshold => "get_threshold",
            Message::GetNextTxId => "get_next_tx_id",
            Message::GetActiveTxidList => "get_active_txid_list",
            Message::GetTx(_) => "get_tx",
            Message::IsTxValid(_) => "is_tx_valid",
            Message::GetTxApprovals(_) => "get_tx_approvals",
            Message::GetTxRejections(_) => "get_tx_rejections",
            Message::GetTxApprovalForAccount(..) => "get_tx_approval_for_account",
        }
    }

    pub fn selector(&self) -> Selector {
        selector_for(self.name())
    }

    /// Whether the entry point only accepts calls from the engine itself
    pub fn is_self_only(&self) -> bool {
        matches!(
            self,
            Message::AddOwner(_)
                | Message::RemoveOwner(_)
                | Message::ChangeThreshold(_)
                | Message::Transfer { .. }
        )
    }

    /// Encode into selector and call input
    ///
    /// # Errors
    /// Returns `InvalidInput` if the arguments fail to serialize
    pub fn encode(&self) -> MultisigResult<(Selector, Vec<u8>)> {
        let input = match self {
            Message::ProposeTx(tx) => serde_json::to_vec(tx),
            Message::ApproveTx(tx_id)
            | Message::RejectTx(tx_id)
            | Message::TryExecuteTx(tx_id)
            | Message::TryRemoveTx(tx_id)
            | Message::GetTx(tx_id)
            | Message::IsTxValid(tx_id)
            | Message::GetTxApprovals(tx_id)
            | Message::GetTxRejections(tx_id) => serde_json::to_vec(tx_id),
            Message::AddOwner(owner) | Message::RemoveOwner(owner) | Message::IsOwner(owner) => {
                serde_json::to_vec(owner)
            }
            Message::ChangeThreshold(threshold) => serde_json::to_vec(threshold),
            Message::Transfer { to, value } => serde_json::to_vec(&(to, value)),
            Message::GetTxApprovalForAccount(tx_id, owner) => serde_json::to_vec(&(tx_id, owner)),
            Message::GetOwners
            | Message::GetThreshold
            | Message::GetNextTxId
            | Message::GetActiveTxidList => Ok(Vec::new()),
        }
        .map_err(|e| MultisigError::InvalidInput(e.to_string()))?;

        Ok((self.selector(), input))
    }

    /// Decode a selector and call input
    ///
    /// # Errors
    /// Returns `InvalidInput` for an unknown selector or malformed arguments
    pub fn decode(selector: Selector, input: &[u8]) -> MultisigResult<Self> {
        let name = MESSAGE_NAMES
            .iter()
            .find(|name| selector_for(name) == selector)
            .ok_or_else(|| {
                MultisigError::InvalidInput(format!("unknown selector 0x{}", hex::encode(selector)))
            })?;

        let message = match *name {
            "propose_tx" => Message::ProposeTx(args(input)?),
            "approve_tx" => Message::ApproveTx(args(input)?),
            "reject_tx" => Message::RejectTx(args(input)?),
            "try_execute_tx" => Message::TryExecuteTx(args(input)?),
            "try_remove_tx" => Message::TryRemoveTx(args(input)?),
            "add_owner" => Message::AddOwner(args(input)?),
            "remove_owner" => Message::RemoveOwner(args(input)?),
            "change_threshold" => Message::ChangeThreshold(args(input)?),
            "transfer" => {
                let (to, value) = args(input)?;
                Message::Transfer { to, value }
            }
            "get_owners" => Message::GetOwners,
            "is_owner" => Message::IsOwner(args(input)?),
            "get_threshold" => Message::GetThreshold,
            "get_next_tx_id" => Message::GetNextTxId,
            "get_active_txid_list" => Message::GetActiveTxidList,
            "get_tx" => Message::GetTx(args(input)?),
            "is_tx_valid" => Message::IsTxValid(args(input)?),
            "get_tx_approvals" => Message::GetTxApprovals(args(input)?),
            "get_tx_rejections" => Message::GetTxRejections(args(input)?),
            "get_tx_approval_for_account" => {
                let (tx_id, owner) = args(input)?;
                Message::GetTxApprovalForAccount(tx_id, owner)
            }
            other => {
                return Err(MultisigError::InvalidInput(format!(
                    "no handler for {}",
                    other
                )))
            }
        };

        Ok(message)
    }
}

fn args<T: DeserializeOwned>(input: &[u8]) -> MultisigResult<T> {
    serde_json::from_slice(input).map_err(|e| MultisigError::InvalidInput(e.to_string()))
}

impl MultisigEngine {
    /// Add an owner (self-call only)
    pub fn add_owner(&mut self, caller: &AccountId, owner: AccountId) -> MultisigResult<()> {
        self.ensure_self_call(caller)?;

        self.registry
            .add_owner(owner.clone(), self.config.max_owners)?;

        log::info!(
            "Owner {} added to {} ({})",
            owner,
            self.address,
            self.registry.description()
        );
        self.emit(Event::OwnerAdded { owner });

        Ok(())
    }

    /// Remove an owner (self-call only)
    pub fn remove_owner(&mut self, caller: &AccountId, owner: AccountId) -> MultisigResult<()> {
        self.ensure_self_call(caller)?;

        self.registry.remove_owner(&owner)?;

        log::info!(
            "Owner {} removed from {} ({})",
            owner,
            self.address,
            self.registry.description()
        );
        self.emit(Event::OwnerRemoved { owner });

        Ok(())
    }

    /// Change the threshold (self-call only)
    pub fn change_threshold(&mut self, caller: &AccountId, threshold: u8) -> MultisigResult<()> {
        self.ensure_self_call(caller)?;

        self.registry.change_threshold(threshold)?;

        log::info!(
            "Threshold of {} changed ({})",
            self.address,
            self.registry.description()
        );
        self.emit(Event::ThresholdChanged { threshold });

        Ok(())
    }

    /// Send funds held by the engine (self-call only)
    ///
    /// Balance checks are left to the environment.
    pub fn transfer(
        &mut self,
        caller: &AccountId,
        to: AccountId,
        value: Balance,
        env: &mut dyn Environment,
    ) -> MultisigResult<()> {
        self.ensure_self_call(caller)?;

        env.transfer(&self.address, &to, value).map_err(|e| {
            log::warn!("Transfer of {} from {} failed: {}", value, self.address, e);
            MultisigError::TransferFailed
        })?;

        self.emit(Event::Transfer { to, value });

        Ok(())
    }

    fn ensure_self_call(&self, caller: &AccountId) -> MultisigResult<()> {
        if caller != &self.address {
            log::debug!("Rejected governance call from {} on {}", caller, self.address);
            return Err(MultisigError::Unauthorized);
        }
        Ok(())
    }
}
