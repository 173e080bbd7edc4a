//! In-memory execution host
//!
//! Owns balances, deployed engines and stub contracts, and routes calls
//! between them. Every call runs on a frame stack used for the reentrancy
//! guard: a call into an account is denied while a frame for that account
//! exists whose outgoing call did not allow re-entry.
//!
//! Handlers that are executing are threaded through every nested call, so a
//! permitted re-entry reaches its target at any depth.

use crate::crypto::{contract_address, AccountId};
use crate::multisig::{Balance, Message, MultisigEngine, MultisigError, Selector};
use crate::runtime::factory::MultisigFactory;
use crate::runtime::stub::{StubContract, StubInstance};
use crate::runtime::{CallFlags, CallRequest, CallResult, EnvError, Environment, MessageHandler};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Gas limit used when a call asks for 0
pub const DEFAULT_GAS_LIMIT: u64 = 100_000;

/// Deepest call stack the host allows
pub const MAX_CALL_DEPTH: usize = 1024;

/// Selector of a call that only moves value
pub const PLAIN_TRANSFER: Selector = [0; 4];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Failed to instantiate multisig: {0}")]
    InstantiationFailed(#[from] MultisigError),

    #[error("Address already in use: {0}")]
    AddressTaken(AccountId),

    #[error("No multisig at {0}")]
    UnknownEngine(AccountId),
}

/// Trace entry for one completed call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub caller: AccountId,
    pub target: AccountId,
    pub selector: Selector,
    pub transferred_value: Balance,
    /// Gas limit after defaulting
    pub gas_limit: u64,
    pub allow_reentry: bool,
    pub success: bool,
}

#[derive(Clone, Debug)]
struct Frame {
    account: AccountId,
    /// Whether the call this frame is making lets callees re-enter it
    allows_reentry: bool,
}

impl Frame {
    fn new(account: AccountId) -> Self {
        Self {
            account,
            allows_reentry: true,
        }
    }
}

/// The host's world state
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Host {
    balances: HashMap<AccountId, Balance>,
    engines: HashMap<AccountId, MultisigEngine>,
    contracts: HashMap<AccountId, StubContract>,
    #[serde(default)]
    factory: MultisigFactory,
    /// Deployment counter for stub addresses
    nonce: u64,
    #[serde(skip)]
    frames: Vec<Frame>,
    #[serde(skip)]
    calls: Vec<CallRecord>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host whose factory hands its limits to new engines
    pub fn with_factory(factory: MultisigFactory) -> Self {
        Self {
            factory,
            ..Self::default()
        }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Mint funds into an account
    pub fn fund(&mut self, account: &AccountId, amount: Balance) {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
        log::debug!("Funded {} with {} (balance {})", account, amount, balance);
    }

    pub fn balance_of(&self, account: &AccountId) -> Balance {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Accounts holding a non-zero balance, sorted
    pub fn accounts(&self) -> Vec<(&AccountId, Balance)> {
        let mut accounts: Vec<(&AccountId, Balance)> = self
            .balances
            .iter()
            .filter(|(_, balance)| **balance > 0)
            .map(|(account, balance)| (account, *balance))
            .collect();
        accounts.sort();
        accounts
    }

    fn move_value(&mut self, from: &AccountId, to: &AccountId, value: Balance) -> Result<(), EnvError> {
        if value == 0 || from == to {
            return Ok(());
        }

        let from_balance = self.balance_of(from);
        if from_balance < value {
            return Err(EnvError::TransferFailed);
        }

        let to_balance = self
            .balance_of(to)
            .checked_add(value)
            .ok_or(EnvError::TransferFailed)?;

        self.balances.insert(from.clone(), from_balance - value);
        self.balances.insert(to.clone(), to_balance);

        Ok(())
    }

    // =========================================================================
    // Deployment
    // =========================================================================

    /// Deploy a stub contract and return its address
    pub fn deploy(&mut self, deployer: &AccountId, contract: StubContract) -> AccountId {
        let address = contract_address(deployer, self.nonce);
        self.nonce += 1;

        log::info!("Deployed {} stub at {}", contract.name(), address);
        self.contracts.insert(address.clone(), contract);

        address
    }

    pub fn contract(&self, address: &AccountId) -> Option<&StubContract> {
        self.contracts.get(address)
    }

    /// Instantiate an engine through the factory
    pub fn instantiate(
        &mut self,
        deployer: &AccountId,
        threshold: u8,
        owners: Vec<AccountId>,
        salt: &[u8],
    ) -> Result<AccountId, HostError> {
        let address = MultisigFactory::address_for(threshold, &owners, salt);
        if self.engines.contains_key(&address) || self.contracts.contains_key(&address) {
            return Err(HostError::AddressTaken(address));
        }

        let engine = self.factory.instantiate(deployer, threshold, owners, salt)?;
        let address = engine.address().clone();
        self.engines.insert(address.clone(), engine);

        Ok(address)
    }

    pub fn engine(&self, address: &AccountId) -> Option<&MultisigEngine> {
        self.engines.get(address)
    }

    pub fn engine_mut(&mut self, address: &AccountId) -> Result<&mut MultisigEngine, HostError> {
        self.engines
            .get_mut(address)
            .ok_or_else(|| HostError::UnknownEngine(address.clone()))
    }

    /// Deployed engines, sorted by address
    pub fn engines(&self) -> Vec<&MultisigEngine> {
        let mut engines: Vec<&MultisigEngine> = self.engines.values().collect();
        engines.sort_by(|a, b| a.address().cmp(b.address()));
        engines
    }

    pub fn factory(&self) -> &MultisigFactory {
        &self.factory
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// Send an engine message from an external account
    pub fn submit(&mut self, caller: &AccountId, engine: &AccountId, message: &Message) -> CallResult {
        let (selector, input) = message.encode()?;
        self.call_from(caller, engine, selector, input, 0)
    }

    /// Perform a call from an external account
    pub fn call_from(
        &mut self,
        caller: &AccountId,
        target: &AccountId,
        selector: Selector,
        input: Vec<u8>,
        value: Balance,
    ) -> CallResult {
        let mut sender = ExternalAccount(caller.clone());
        let origin: &mut dyn MessageHandler = &mut sender;
        let request = CallRequest {
            caller: caller.clone(),
            target: target.clone(),
            selector,
            input,
            transferred_value: value,
            gas_limit: 0,
            flags: CallFlags::empty(),
        };

        self.call_with(vec![origin], request)
    }

    /// Completed calls, innermost first
    pub fn calls(&self) -> &[CallRecord] {
        &self.calls
    }

    /// Run one call with full bookkeeping
    ///
    /// `running` holds every handler executing on the current call stack,
    /// outermost first. Its last entry is the one making this call.
    fn call_with(
        &mut self,
        running: Vec<&mut dyn MessageHandler>,
        request: CallRequest,
    ) -> CallResult {
        let root = self.frames.is_empty();
        if root {
            self.frames.push(Frame::new(request.caller.clone()));
        }

        let gas_limit = match request.gas_limit {
            0 => DEFAULT_GAS_LIMIT,
            limit => limit,
        };
        let mut record = CallRecord {
            caller: request.caller.clone(),
            target: request.target.clone(),
            selector: request.selector,
            transferred_value: request.transferred_value,
            gas_limit,
            allow_reentry: request.allows_reentry(),
            success: false,
        };

        if let Some(frame) = self.frames.last_mut() {
            frame.allows_reentry = request.allows_reentry();
        }

        let result = self.enter(running, request, gas_limit);

        if let Some(frame) = self.frames.last_mut() {
            frame.allows_reentry = true;
        }
        if root {
            self.frames.pop();
        }

        record.success = result.is_ok();
        if let Err(err) = &result {
            log::debug!("Call {} -> {} failed: {}", record.caller, record.target, err);
        }
        self.calls.push(record);

        result
    }

    fn enter(
        &mut self,
        running: Vec<&mut dyn MessageHandler>,
        request: CallRequest,
        gas_limit: u64,
    ) -> CallResult {
        if self.frames.len() >= MAX_CALL_DEPTH {
            return Err(EnvError::CalleeTrapped.into());
        }

        if self
            .frames
            .iter()
            .any(|f| f.account == request.target && !f.allows_reentry)
        {
            log::warn!(
                "Re-entry into {} from {} denied",
                request.target,
                request.caller
            );
            return Err(EnvError::ReentranceDenied.into());
        }

        // Balances are restored wholesale if the call fails
        let checkpoint = self.balances.clone();
        self.move_value(&request.caller, &request.target, request.transferred_value)?;

        self.frames.push(Frame::new(request.target.clone()));
        let result = self.route(running, request, gas_limit);
        self.frames.pop();

        if result.is_err() {
            self.balances = checkpoint;
        }

        result
    }

    fn route(
        &mut self,
        mut running: Vec<&mut dyn MessageHandler>,
        request: CallRequest,
        gas_limit: u64,
    ) -> CallResult {
        let CallRequest {
            caller,
            target,
            selector,
            input,
            ..
        } = request;

        // Re-entry into a handler that is already executing
        if let Some(index) = running.iter().rposition(|h| h.address() == &target) {
            let handler = running.remove(index);
            let mut scope = Scope {
                host: self,
                running,
            };
            return handler.handle_message(&caller, selector, &input, &mut scope);
        }

        if let Some(mut engine) = self.engines.remove(&target) {
            let mut scope = Scope {
                host: self,
                running,
            };
            let result = engine.handle_message(&caller, selector, &input, &mut scope);
            self.engines.insert(target, engine);
            return result;
        }

        if let Some(contract) = self.contracts.remove(&target) {
            if contract.gas_cost() > gas_limit {
                self.contracts.insert(target, contract);
                return Err(EnvError::OutOfGas.into());
            }

            let mut instance = StubInstance::new(target.clone(), contract);
            let mut scope = Scope {
                host: self,
                running,
            };
            let result = instance.handle_message(&caller, selector, &input, &mut scope);
            self.contracts.insert(target, instance.into_contract());
            return result;
        }

        // A bare call with no message is a plain value transfer
        if selector == PLAIN_TRANSFER && input.is_empty() {
            return Ok(Vec::new());
        }

        Err(EnvError::NotCallable.into())
    }
}

impl Environment for Host {
    fn call(&mut self, origin: &mut dyn MessageHandler, request: CallRequest) -> CallResult {
        self.call_with(vec![origin], request)
    }

    fn transfer(&mut self, from: &AccountId, to: &AccountId, value: Balance) -> Result<(), EnvError> {
        self.move_value(from, to, value)
    }

    fn balance(&self, account: &AccountId) -> Balance {
        self.balance_of(account)
    }
}

/// The host as seen by a running handler
struct Scope<'a, 'h> {
    host: &'a mut Host,
    /// Handlers further up the call stack, outermost first
    running: Vec<&'h mut dyn MessageHandler>,
}

impl Environment for Scope<'_, '_> {
    fn call(&mut self, origin: &mut dyn MessageHandler, request: CallRequest) -> CallResult {
        let running = nested_stack(&mut self.running, origin);
        self.host.call_with(running, request)
    }

    fn transfer(&mut self, from: &AccountId, to: &AccountId, value: Balance) -> Result<(), EnvError> {
        self.host.move_value(from, to, value)
    }

    fn balance(&self, account: &AccountId) -> Balance {
        self.host.balance_of(account)
    }
}

/// Reborrow the running handlers and put `origin` on top
fn nested_stack<'s>(
    running: &'s mut [&mut dyn MessageHandler],
    origin: &'s mut dyn MessageHandler,
) -> Vec<&'s mut dyn MessageHandler> {
    let mut stack: Vec<&'s mut dyn MessageHandler> = Vec::with_capacity(running.len() + 1);
    for handler in running.iter_mut() {
        stack.push(&mut **handler);
    }
    stack.push(origin);
    stack
}

/// Plain account at the bottom of a call stack
struct ExternalAccount(AccountId);

impl MessageHandler for ExternalAccount {
    fn address(&self) -> &AccountId {
        &self.0
    }

    fn handle_message(
        &mut self,
        _caller: &AccountId,
        _selector: Selector,
        _input: &[u8],
        _env: &mut dyn Environment,
    ) -> CallResult {
        Err(EnvError::NotCallable.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multisig::{Event, QuorumOutcome, Transaction, TxId, TxResult};

    fn acc(name: &str) -> AccountId {
        AccountId::from(name)
    }

    fn abc_host(threshold: u8) -> (Host, AccountId) {
        let mut host = Host::new();
        let engine = host
            .instantiate(
                &acc("deployer"),
                threshold,
                vec![acc("alice"), acc("bob"), acc("charlie")],
                b"test",
            )
            .unwrap();
        (host, engine)
    }

    fn decode<T: serde::de::DeserializeOwned>(output: Vec<u8>) -> T {
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn test_fund_and_balance() {
        let mut host = Host::new();
        host.fund(&acc("alice"), 100);
        host.fund(&acc("alice"), 50);

        assert_eq!(host.balance_of(&acc("alice")), 150);
        assert_eq!(host.balance_of(&acc("nobody")), 0);
        assert_eq!(host.accounts(), vec![(&acc("alice"), 150)]);
    }

    #[test]
    fn test_deploy_addresses_are_unique() {
        let mut host = Host::new();
        let a = host.deploy(&acc("alice"), StubContract::Echo);
        let b = host.deploy(&acc("alice"), StubContract::Echo);

        assert_ne!(a, b);
        assert_eq!(host.contract(&a), Some(&StubContract::Echo));
    }

    #[test]
    fn test_instantiate_rejects_reused_address() {
        let (mut host, engine) = abc_host(2);

        let result = host.instantiate(
            &acc("deployer"),
            2,
            vec![acc("alice"), acc("bob"), acc("charlie")],
            b"test",
        );

        assert_eq!(result, Err(HostError::AddressTaken(engine)));
        assert_eq!(host.factory().instances().len(), 1);
    }

    #[test]
    fn test_instantiate_invalid_parameters() {
        let mut host = Host::new();
        let result = host.instantiate(&acc("deployer"), 0, vec![acc("alice")], b"");

        assert_eq!(
            result,
            Err(HostError::InstantiationFailed(MultisigError::ThresholdCantBeZero))
        );
    }

    #[test]
    fn test_call_into_plain_account() {
        let mut host = Host::new();
        host.fund(&acc("alice"), 10);

        let result = host.call_from(&acc("alice"), &acc("bob"), [1, 2, 3, 4], vec![], 5);
        assert_eq!(result, Err(EnvError::NotCallable.into()));
        assert!(!host.calls()[0].success);
        assert_eq!(host.balance_of(&acc("bob")), 0);

        let result = host.call_from(&acc("alice"), &acc("bob"), PLAIN_TRANSFER, vec![], 5);
        assert_eq!(result, Ok(Vec::new()));
        assert_eq!(host.balance_of(&acc("bob")), 5);
    }

    #[test]
    fn test_value_refunded_on_failure() {
        let mut host = Host::new();
        let revert = host.deploy(&acc("alice"), StubContract::Revert);
        let echo = host.deploy(&acc("alice"), StubContract::Echo);
        host.fund(&acc("alice"), 100);

        let result = host.call_from(&acc("alice"), &revert, [0; 4], vec![], 60);
        assert_eq!(result, Err(EnvError::CalleeReverted.into()));
        assert_eq!(host.balance_of(&acc("alice")), 100);
        assert_eq!(host.balance_of(&revert), 0);

        host.call_from(&acc("alice"), &echo, [0; 4], vec![], 60).unwrap();
        assert_eq!(host.balance_of(&acc("alice")), 40);
        assert_eq!(host.balance_of(&echo), 60);

        let result = host.call_from(&acc("alice"), &echo, [0; 4], vec![], 41);
        assert_eq!(result, Err(EnvError::TransferFailed.into()));
    }

    #[test]
    fn test_gas_limit_defaults_and_runs_out() {
        let (mut host, engine) = abc_host(1);
        let counter = host.deploy(&acc("alice"), StubContract::Counter { count: 0 });

        let starved = Transaction::new(counter.clone(), [0; 4], vec![]).with_gas_limit(1_000);
        host.submit(&acc("alice"), &engine, &Message::ProposeTx(starved))
            .unwrap();

        assert_eq!(
            host.engine(&engine).unwrap().events().last_executed(),
            Some(&TxResult::Failed(EnvError::OutOfGas.into()))
        );
        assert_eq!(host.contract(&counter), Some(&StubContract::Counter { count: 0 }));

        let defaulted = Transaction::new(counter.clone(), [0; 4], vec![]);
        host.submit(&acc("alice"), &engine, &Message::ProposeTx(defaulted))
            .unwrap();

        assert_eq!(host.contract(&counter), Some(&StubContract::Counter { count: 1 }));
        let record = host.calls().iter().find(|c| c.target == counter && c.success).unwrap();
        assert_eq!(record.gas_limit, DEFAULT_GAS_LIMIT);
    }

    #[test]
    fn test_end_to_end_governance() {
        let (mut host, engine) = abc_host(2);
        let add_dave = Transaction::self_call(&engine, &Message::AddOwner(acc("dave"))).unwrap();

        let tx_id: TxId = decode(
            host.submit(&acc("alice"), &engine, &Message::ProposeTx(add_dave))
                .unwrap(),
        );
        let outcome: QuorumOutcome = decode(
            host.submit(&acc("bob"), &engine, &Message::ApproveTx(tx_id))
                .unwrap(),
        );

        assert!(matches!(outcome, QuorumOutcome::Executed(TxResult::Success(_))));

        let owners: Vec<AccountId> =
            decode(host.submit(&acc("eve"), &engine, &Message::GetOwners).unwrap());
        assert!(owners.contains(&acc("dave")));

        // The engine called itself on behalf of the proposal
        assert!(host
            .calls()
            .iter()
            .any(|c| c.caller == engine && c.target == engine && c.success));
    }

    #[test]
    fn test_direct_governance_call_from_owner() {
        let (mut host, engine) = abc_host(2);

        let result = host.submit(&acc("alice"), &engine, &Message::ChangeThreshold(1));

        assert_eq!(result, Err(MultisigError::Unauthorized));
        assert_eq!(host.engine(&engine).unwrap().get_threshold(), 2);
    }

    #[test]
    fn test_self_call_without_reentry_denied() {
        let (mut host, engine) = abc_host(1);
        let tx = Transaction::self_call(&engine, &Message::ChangeThreshold(2))
            .unwrap()
            .with_reentry(false);

        host.submit(&acc("alice"), &engine, &Message::ProposeTx(tx))
            .unwrap();

        let engine = host.engine(&engine).unwrap();
        assert_eq!(engine.get_threshold(), 1);
        assert_eq!(
            engine.events().last_executed(),
            Some(&TxResult::Failed(EnvError::ReentranceDenied.into()))
        );
    }

    #[test]
    fn test_callback_reenters_hosted_engine() {
        let (mut host, engine) = abc_host(1);
        let (selector, input) = Message::GetThreshold.encode().unwrap();
        let callback = host.deploy(&acc("alice"), StubContract::CallBack { selector, input });

        let tx = Transaction::new(callback, [0; 4], vec![]).with_reentry(true);
        host.submit(&acc("alice"), &engine, &Message::ProposeTx(tx))
            .unwrap();

        assert_eq!(
            host.engine(&engine).unwrap().events().last_executed(),
            Some(&TxResult::Success(b"1".to_vec()))
        );
    }

    #[test]
    fn test_engine_to_engine_call() {
        let (mut host, inner) = abc_host(2);
        let outer = host
            .instantiate(&acc("deployer"), 1, vec![acc("alice")], b"outer")
            .unwrap();

        // The outer engine, owning nothing in `inner`, proposes there
        let counter = host.deploy(&acc("alice"), StubContract::Counter { count: 0 });
        let inner_tx = Transaction::new(counter, [0; 4], vec![]);
        let (selector, input) = Message::ProposeTx(inner_tx).encode().unwrap();
        let tx = Transaction::new(inner.clone(), selector, input);

        host.submit(&acc("alice"), &outer, &Message::ProposeTx(tx))
            .unwrap();

        assert_eq!(
            host.engine(&outer).unwrap().events().last_executed(),
            Some(&TxResult::Failed(MultisigError::Unauthorized))
        );
        assert!(host.engine(&inner).unwrap().get_active_txid_list().is_empty());
    }

    /// Three single-owner engines, each owned by the one before it
    fn engine_chain(host: &mut Host) -> (AccountId, AccountId, AccountId) {
        let first = host
            .instantiate(&acc("deployer"), 1, vec![acc("alice")], b"first")
            .unwrap();
        let second = host
            .instantiate(&acc("deployer"), 1, vec![first.clone()], b"second")
            .unwrap();
        let third = host
            .instantiate(&acc("deployer"), 1, vec![second.clone()], b"third")
            .unwrap();
        (first, second, third)
    }

    /// A proposal on `engine` whose execution proposes `tx` there
    fn propose_on(engine: &AccountId, tx: Transaction, allow_reentry: bool) -> Transaction {
        let (selector, input) = Message::ProposeTx(tx).encode().unwrap();
        Transaction::new(engine.clone(), selector, input).with_reentry(allow_reentry)
    }

    #[test]
    fn test_reentry_through_engine_cycle() {
        let mut host = Host::new();
        let (first, second, third) = engine_chain(&mut host);

        let (selector, input) = Message::GetThreshold.encode().unwrap();
        let back_to_first = Transaction::new(first.clone(), selector, input).with_reentry(true);
        let tx = propose_on(&second, propose_on(&third, back_to_first, true), true);

        host.submit(&acc("alice"), &first, &Message::ProposeTx(tx))
            .unwrap();

        assert_eq!(
            host.engine(&third).unwrap().events().last_executed(),
            Some(&TxResult::Success(b"1".to_vec()))
        );
        assert_eq!(
            host.engine(&second).unwrap().events().last_executed(),
            Some(&TxResult::Success(b"0".to_vec()))
        );
        assert_eq!(
            host.engine(&first).unwrap().events().last_executed(),
            Some(&TxResult::Success(b"0".to_vec()))
        );
    }

    #[test]
    fn test_reentry_denied_deep_in_cycle() {
        let mut host = Host::new();
        let (first, second, third) = engine_chain(&mut host);

        let (selector, input) = Message::GetThreshold.encode().unwrap();
        let back_to_first = Transaction::new(first.clone(), selector, input).with_reentry(true);
        // The first hop forbids re-entry into `first`
        let tx = propose_on(&second, propose_on(&third, back_to_first, true), false);

        host.submit(&acc("alice"), &first, &Message::ProposeTx(tx))
            .unwrap();

        assert_eq!(
            host.engine(&third).unwrap().events().last_executed(),
            Some(&TxResult::Failed(EnvError::ReentranceDenied.into()))
        );
        assert_eq!(
            host.engine(&first).unwrap().events().last_executed(),
            Some(&TxResult::Success(b"0".to_vec()))
        );
    }

    #[test]
    fn test_instantiate_distinct_owner_splits() {
        let mut host = Host::new();

        let a = host
            .instantiate(&acc("deployer"), 1, vec![acc("a"), acc("bc")], b"")
            .unwrap();
        let b = host
            .instantiate(&acc("deployer"), 1, vec![acc("ab"), acc("c")], b"")
            .unwrap();
        let c = host
            .instantiate(&acc("deployer"), 1, vec![acc("alicex")], b"")
            .unwrap();
        let d = host
            .instantiate(&acc("deployer"), 1, vec![acc("alice")], b"x")
            .unwrap();

        assert_ne!(a, b);
        assert_ne!(c, d);
        assert_eq!(host.engines().len(), 4);
    }

    #[test]
    fn test_engine_funds_through_host() {
        let (mut host, engine) = abc_host(2);
        host.fund(&engine, 500);
        let pay = Transaction::self_call(
            &engine,
            &Message::Transfer {
                to: acc("eve"),
                value: 200,
            },
        )
        .unwrap();

        host.submit(&acc("alice"), &engine, &Message::ProposeTx(pay))
            .unwrap();
        host.submit(&acc("charlie"), &engine, &Message::ApproveTx(0))
            .unwrap();

        assert_eq!(host.balance_of(&engine), 300);
        assert_eq!(host.balance_of(&acc("eve")), 200);
        assert!(host
            .engine(&engine)
            .unwrap()
            .events()
            .events()
            .any(|e| matches!(e, Event::Transfer { value: 200, .. })));
    }

    #[test]
    fn test_unknown_engine() {
        let mut host = Host::new();
        assert!(matches!(
            host.engine_mut(&acc("3Nothing")),
            Err(HostError::UnknownEngine(_))
        ));
    }

    #[test]
    fn test_host_state_roundtrip() {
        let (mut host, engine) = abc_host(2);
        host.fund(&acc("alice"), 10);
        host.submit(
            &acc("alice"),
            &engine,
            &Message::ProposeTx(Transaction::new(acc("bob"), [0; 4], vec![])),
        )
        .unwrap();

        let json = serde_json::to_string(&host).unwrap();
        let restored: Host = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.balance_of(&acc("alice")), 10);
        assert_eq!(
            restored.engine(&engine).unwrap().get_active_txid_list(),
            vec![0]
        );
        assert!(restored.calls().is_empty());
    }
}
