//! Execution environment boundary
//!
//! The engine never performs calls or moves funds itself. It hands a
//! [`CallRequest`] to an [`Environment`], which owns balances, routes the call
//! and enforces the reentrancy guard.
//!
//! [`Host`] is an in-memory environment able to run engines end-to-end:
//! - Account balances and value transfer
//! - A call stack with a reentrancy guard driven by [`CallFlags`]
//! - Stub contracts to call into
//! - A factory deploying engines at derived addresses

pub mod factory;
pub mod host;
pub mod stub;

use crate::crypto::AccountId;
use crate::multisig::{Balance, MultisigError, Selector, Transaction};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use factory::{MultisigFactory, NewMultisig};
pub use host::{CallRecord, Host, HostError, DEFAULT_GAS_LIMIT, MAX_CALL_DEPTH, PLAIN_TRANSFER};
pub use stub::StubContract;

bitflags! {
    /// Flags attached to an outgoing call
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CallFlags: u32 {
        /// The callee, and anything it calls, may call back into the caller
        const ALLOW_REENTRY = 0b0000_0001;
    }
}

/// Failures reported by the execution environment
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvError {
    #[error("Failed to decode call data")]
    Decode,
    #[error("Callee trapped")]
    CalleeTrapped,
    #[error("Callee reverted")]
    CalleeReverted,
    #[error("Value transfer failed")]
    TransferFailed,
    #[error("Target account is not callable")]
    NotCallable,
    #[error("Re-entry into a running contract was denied")]
    ReentranceDenied,
    #[error("Out of gas")]
    OutOfGas,
    #[error("Unexpected environment error")]
    Unexpected,
}

/// Result of an outgoing call
///
/// Environment failures arrive as [`MultisigError::EnvExecutionFailed`]; a
/// call into an engine that rejects the message returns that engine's error.
pub type CallResult = Result<Vec<u8>, MultisigError>;

/// A single outgoing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub caller: AccountId,
    pub target: AccountId,
    pub selector: Selector,
    pub input: Vec<u8>,
    pub transferred_value: Balance,
    /// 0 means the environment's default
    pub gas_limit: u64,
    pub flags: CallFlags,
}

impl CallRequest {
    /// Build the call an engine makes for one of its transactions
    pub fn from_transaction(caller: AccountId, tx: &Transaction) -> Self {
        Self {
            caller,
            target: tx.address.clone(),
            selector: tx.selector,
            input: tx.input.clone(),
            transferred_value: tx.transferred_value,
            gas_limit: tx.gas_limit,
            flags: tx.call_flags(),
        }
    }

    pub fn allows_reentry(&self) -> bool {
        self.flags.contains(CallFlags::ALLOW_REENTRY)
    }
}

/// Something that can receive encoded messages
pub trait MessageHandler {
    /// Account the handler lives at
    fn address(&self) -> &AccountId;

    /// Decode and run one message on behalf of `caller`
    fn handle_message(
        &mut self,
        caller: &AccountId,
        selector: Selector,
        input: &[u8],
        env: &mut dyn Environment,
    ) -> CallResult;
}

/// The world as seen from inside an engine
pub trait Environment {
    /// Perform a call on behalf of `origin`
    ///
    /// `origin` is the handler currently executing. A call that targets it
    /// again is routed back into it when the guard allows re-entry.
    fn call(&mut self, origin: &mut dyn MessageHandler, request: CallRequest) -> CallResult;

    /// Move native value between accounts
    fn transfer(&mut self, from: &AccountId, to: &AccountId, value: Balance)
        -> Result<(), EnvError>;

    fn balance(&self, account: &AccountId) -> Balance;
}
