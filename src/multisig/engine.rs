//! The authorization engine
//!
//! [`MultisigEngine`] is the single owned aggregate behind every entry point:
//! owner registry, transaction ledger and event log. Entry points take the
//! caller explicitly and the environment by exclusive reference, and run to
//! completion, including any dispatch they trigger.
//!
//! A transaction moves from pending to one of two terminal states:
//! - executed: approvals reached the threshold, the call was dispatched and
//!   the transaction removed whatever the call returned
//! - cancelled: rejections made the threshold unreachable, the transaction
//!   was removed without dispatch

use crate::crypto::AccountId;
use crate::multisig::config::EngineConfig;
use crate::multisig::dispatch::dispatch;
use crate::multisig::error::{MultisigError, MultisigResult};
use crate::multisig::events::{Event, EventLog};
use crate::multisig::governance::Message;
use crate::multisig::ledger::TransactionLedger;
use crate::multisig::quorum::{self, QuorumOutcome};
use crate::multisig::registry::OwnerRegistry;
use crate::multisig::transaction::{PendingTx, Selector, Transaction, TxId, Vote};
use crate::runtime::{CallResult, Environment, MessageHandler};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A multi-owner account that executes calls once a quorum approves them
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultisigEngine {
    /// Account the engine lives at
    pub(crate) address: AccountId,
    #[serde(default)]
    pub(crate) config: EngineConfig,
    pub(crate) registry: OwnerRegistry,
    pub(crate) ledger: TransactionLedger,
    pub(crate) events: EventLog,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl MultisigEngine {
    /// Create an engine with the default limits
    ///
    /// # Errors
    /// Returns error if the owners or threshold are invalid
    pub fn new(address: AccountId, threshold: u8, owners: Vec<AccountId>) -> MultisigResult<Self> {
        Self::with_config(address, threshold, owners, EngineConfig::default())
    }

    /// Create an engine with explicit limits
    pub fn with_config(
        address: AccountId,
        threshold: u8,
        owners: Vec<AccountId>,
        config: EngineConfig,
    ) -> MultisigResult<Self> {
        let registry = OwnerRegistry::new(threshold, owners, config.max_owners)?;

        log::info!(
            "Multisig {} created ({})",
            address,
            registry.description()
        );

        Ok(Self {
            address,
            config,
            registry,
            ledger: TransactionLedger::new(),
            events: EventLog::new(),
            created_at: Utc::now(),
        })
    }

    /// Create an engine owned by `owner` alone, with threshold 1
    pub fn single_owner(address: AccountId, owner: AccountId) -> Self {
        Self {
            address,
            config: EngineConfig::default(),
            registry: OwnerRegistry::single(owner),
            ledger: TransactionLedger::new(),
            events: EventLog::new(),
            created_at: Utc::now(),
        }
    }

    pub fn address(&self) -> &AccountId {
        &self.address
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &OwnerRegistry {
        &self.registry
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Mutable access to the event log, for consumers that drain it
    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    /// Pending transactions in proposal order
    pub fn pending(&self) -> impl Iterator<Item = &PendingTx> {
        self.ledger.iter()
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Propose a transaction
    ///
    /// The proposer's approval is counted straight away, so with threshold 1
    /// the transaction executes and is removed before this returns.
    pub fn propose_tx(
        &mut self,
        caller: &AccountId,
        tx: Transaction,
        env: &mut dyn Environment,
    ) -> MultisigResult<TxId> {
        self.ensure_caller_is_owner(caller)?;

        let tx_id = self
            .ledger
            .insert(caller.clone(), tx.clone(), self.config.max_transactions)?;

        log::info!(
            "Transaction {} proposed on {} by {} (target {})",
            tx_id,
            self.address,
            caller,
            tx.address
        );

        self.emit(Event::TransactionProposed {
            tx_id,
            contract_address: tx.address,
            selector: tx.selector,
            input: tx.input,
            transferred_value: tx.transferred_value,
            gas_limit: tx.gas_limit,
            allow_reentry: tx.allow_reentry,
        });

        self.execute_if_approved(tx_id, env);

        Ok(tx_id)
    }

    /// Approve a pending transaction, executing it on quorum
    pub fn approve_tx(
        &mut self,
        caller: &AccountId,
        tx_id: TxId,
        env: &mut dyn Environment,
    ) -> MultisigResult<QuorumOutcome> {
        self.ensure_can_vote(caller, tx_id)?;
        self.record_vote(caller, tx_id, true)?;

        log::debug!("{} approved transaction {} on {}", caller, tx_id, self.address);
        self.emit(Event::Approve {
            tx_id,
            owner: caller.clone(),
        });

        Ok(self.execute_if_approved(tx_id, env))
    }

    /// Reject a pending transaction, cancelling it once quorum is out of reach
    pub fn reject_tx(&mut self, caller: &AccountId, tx_id: TxId) -> MultisigResult<QuorumOutcome> {
        self.ensure_can_vote(caller, tx_id)?;
        self.record_vote(caller, tx_id, false)?;

        log::debug!("{} rejected transaction {} on {}", caller, tx_id, self.address);
        self.emit(Event::Reject {
            tx_id,
            owner: caller.clone(),
        });

        Ok(self.cancel_if_unreachable(tx_id))
    }

    /// Re-check quorum and execute if it is met
    ///
    /// Registry changes do not rescan pending transactions; this is how a
    /// transaction that became executable gets executed.
    pub fn try_execute_tx(
        &mut self,
        caller: &AccountId,
        tx_id: TxId,
        env: &mut dyn Environment,
    ) -> MultisigResult<QuorumOutcome> {
        self.ensure_caller_is_owner(caller)?;
        self.ensure_exists(tx_id)?;

        Ok(self.execute_if_approved(tx_id, env))
    }

    /// Re-check quorum and cancel if it can no longer be met
    pub fn try_remove_tx(
        &mut self,
        caller: &AccountId,
        tx_id: TxId,
    ) -> MultisigResult<QuorumOutcome> {
        self.ensure_caller_is_owner(caller)?;
        self.ensure_exists(tx_id)?;

        Ok(self.cancel_if_unreachable(tx_id))
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn get_owners(&self) -> Vec<AccountId> {
        self.registry.owners().to_vec()
    }

    pub fn is_owner(&self, account: &AccountId) -> bool {
        self.registry.is_owner(account)
    }

    pub fn get_threshold(&self) -> u8 {
        self.registry.threshold()
    }

    pub fn get_next_tx_id(&self) -> TxId {
        self.ledger.next_tx_id()
    }

    pub fn get_active_txid_list(&self) -> Vec<TxId> {
        self.ledger.active_ids()
    }

    pub fn get_tx(&self, tx_id: TxId) -> Option<Transaction> {
        self.ledger.transaction(tx_id).cloned()
    }

    /// Ok if the transaction exists and the threshold is still reachable
    pub fn is_tx_valid(&self, tx_id: TxId) -> MultisigResult<()> {
        let pending = self.ledger.get(tx_id).ok_or(MultisigError::InvalidTxId)?;

        if !quorum::threshold_can_be_met(
            pending.rejections(),
            self.registry.owner_count(),
            self.registry.threshold(),
        ) {
            return Err(MultisigError::InvalidTxId);
        }

        Ok(())
    }

    pub fn get_tx_approvals(&self, tx_id: TxId) -> Option<u8> {
        self.ledger.approvals(tx_id)
    }

    pub fn get_tx_rejections(&self, tx_id: TxId) -> Option<u8> {
        self.ledger.rejections(tx_id)
    }

    pub fn get_tx_approval_for_account(&self, tx_id: TxId, owner: &AccountId) -> Option<Vote> {
        self.ledger.vote_of(tx_id, owner)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    pub(crate) fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    fn ensure_caller_is_owner(&self, caller: &AccountId) -> MultisigResult<()> {
        if !self.registry.is_owner(caller) {
            return Err(MultisigError::Unauthorized);
        }
        Ok(())
    }

    fn ensure_exists(&self, tx_id: TxId) -> MultisigResult<()> {
        self.ledger
            .contains(tx_id)
            .then_some(())
            .ok_or(MultisigError::InvalidTxId)
    }

    fn ensure_can_vote(&self, caller: &AccountId, tx_id: TxId) -> MultisigResult<()> {
        self.ensure_caller_is_owner(caller)?;
        self.is_tx_valid(tx_id)?;

        if self
            .ledger
            .get(tx_id)
            .is_some_and(|pending| pending.has_voted(caller))
        {
            return Err(MultisigError::AlreadyVoted);
        }

        Ok(())
    }

    fn record_vote(&mut self, caller: &AccountId, tx_id: TxId, approve: bool) -> MultisigResult<()> {
        self.ledger
            .get_mut(tx_id)
            .ok_or(MultisigError::InvalidTxId)?
            .record(caller.clone(), approve)
    }

    fn execute_if_approved(&mut self, tx_id: TxId, env: &mut dyn Environment) -> QuorumOutcome {
        let threshold = self.registry.threshold();
        let approved = self
            .ledger
            .approvals(tx_id)
            .is_some_and(|approvals| quorum::threshold_met(approvals, threshold));

        if !approved {
            return QuorumOutcome::Pending;
        }

        self.execute_tx(tx_id, env)
    }

    /// Dispatch a transaction and drop it from the ledger
    ///
    /// The transaction leaves the ledger before the call goes out, so a
    /// re-entrant call cannot execute it a second time.
    fn execute_tx(&mut self, tx_id: TxId, env: &mut dyn Environment) -> QuorumOutcome {
        let Some(pending) = self.ledger.remove(tx_id) else {
            return QuorumOutcome::Pending;
        };

        log::info!("Executing transaction {} on {}", tx_id, self.address);

        let result = dispatch(self, &pending.tx, env);

        if result.is_success() {
            log::info!("Transaction {} on {} succeeded", tx_id, self.address);
        } else {
            log::warn!("Transaction {} on {} failed: {:?}", tx_id, self.address, result);
        }

        self.emit(Event::TransactionExecuted {
            tx_id,
            result: result.clone(),
        });
        self.emit(Event::TransactionRemoved { tx_id });

        QuorumOutcome::Executed(result)
    }

    fn cancel_if_unreachable(&mut self, tx_id: TxId) -> QuorumOutcome {
        let Some(rejections) = self.ledger.rejections(tx_id) else {
            return QuorumOutcome::Pending;
        };

        if quorum::threshold_can_be_met(
            rejections,
            self.registry.owner_count(),
            self.registry.threshold(),
        ) {
            return QuorumOutcome::Pending;
        }

        log::info!(
            "Transaction {} on {} can no longer reach quorum, cancelling",
            tx_id,
            self.address
        );
        self.emit(Event::TransactionCancelled { tx_id });
        self.remove_tx(tx_id);

        QuorumOutcome::Cancelled
    }

    /// Delete a transaction; no-op when it is already gone
    fn remove_tx(&mut self, tx_id: TxId) {
        if self.ledger.remove(tx_id).is_some() {
            self.emit(Event::TransactionRemoved { tx_id });
        }
    }
}

impl MessageHandler for MultisigEngine {
    fn address(&self) -> &AccountId {
        &self.address
    }

    fn handle_message(
        &mut self,
        caller: &AccountId,
        selector: Selector,
        input: &[u8],
        env: &mut dyn Environment,
    ) -> CallResult {
        let message = Message::decode(selector, input)?;
        log::debug!("{} <- {} from {}", self.address, message.name(), caller);

        match message {
            Message::ProposeTx(tx) => encode(&self.propose_tx(caller, tx, env)?),
            Message::ApproveTx(tx_id) => encode(&self.approve_tx(caller, tx_id, env)?),
            Message::RejectTx(tx_id) => encode(&self.reject_tx(caller, tx_id)?),
            Message::TryExecuteTx(tx_id) => encode(&self.try_execute_tx(caller, tx_id, env)?),
            Message::TryRemoveTx(tx_id) => encode(&self.try_remove_tx(caller, tx_id)?),
            Message::AddOwner(owner) => encode(&self.add_owner(caller, owner)?),
            Message::RemoveOwner(owner) => encode(&self.remove_owner(caller, owner)?),
            Message::ChangeThreshold(threshold) => {
                encode(&self.change_threshold(caller, threshold)?)
            }
            Message::Transfer { to, value } => encode(&self.transfer(caller, to, value, env)?),
            Message::GetOwners => encode(&self.get_owners()),
            Message::IsOwner(account) => encode(&self.is_owner(&account)),
            Message::GetThreshold => encode(&self.get_threshold()),
            Message::GetNextTxId => encode(&self.get_next_tx_id()),
            Message::GetActiveTxidList => encode(&self.get_active_txid_list()),
            Message::GetTx(tx_id) => encode(&self.get_tx(tx_id)),
            Message::IsTxValid(tx_id) => encode(&self.is_tx_valid(tx_id).is_ok()),
            Message::GetTxApprovals(tx_id) => encode(&self.get_tx_approvals(tx_id)),
            Message::GetTxRejections(tx_id) => encode(&self.get_tx_rejections(tx_id)),
            Message::GetTxApprovalForAccount(tx_id, owner) => {
                encode(&self.get_tx_approval_for_account(tx_id, &owner))
            }
        }
    }
}

fn encode<T: Serialize>(value: &T) -> CallResult {
    serde_json::to_vec(value).map_err(|e| MultisigError::InvalidInput(e.to_string()))
}
