//! Stub contracts
//!
//! Minimal callees for exercising the engine's outgoing calls. They ignore
//! the selector and behave according to their kind.

use crate::crypto::AccountId;
use crate::multisig::Selector;
use crate::runtime::{CallFlags, CallRequest, CallResult, EnvError, Environment, MessageHandler};
use serde::{Deserialize, Serialize};

/// Behaviour of a deployed stub
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StubContract {
    /// Returns its input
    Echo,
    /// Always reverts
    Revert,
    /// Always traps
    Trap,
    /// Increments a counter and returns the new value (u64, big-endian)
    Counter { count: u64 },
    /// Calls back into its caller with a fixed message, without allowing
    /// re-entry into itself, and returns whatever the caller answered
    CallBack { selector: Selector, input: Vec<u8> },
}

impl StubContract {
    pub fn name(&self) -> &'static str {
        match self {
            StubContract::Echo => "echo",
            StubContract::Revert => "revert",
            StubContract::Trap => "trap",
            StubContract::Counter { .. } => "counter",
            StubContract::CallBack { .. } => "callback",
        }
    }

    /// Gas one invocation consumes
    pub fn gas_cost(&self) -> u64 {
        match self {
            StubContract::Echo => 2_000,
            StubContract::Counter { .. } => 5_000,
            StubContract::CallBack { .. } => 10_000,
            StubContract::Revert | StubContract::Trap => 0,
        }
    }
}

/// A stub bound to its address while it runs
pub struct StubInstance {
    address: AccountId,
    contract: StubContract,
}

impl StubInstance {
    pub fn new(address: AccountId, contract: StubContract) -> Self {
        Self { address, contract }
    }

    pub fn into_contract(self) -> StubContract {
        self.contract
    }
}

impl MessageHandler for StubInstance {
    fn address(&self) -> &AccountId {
        &self.address
    }

    fn handle_message(
        &mut self,
        caller: &AccountId,
        _selector: Selector,
        input: &[u8],
        env: &mut dyn Environment,
    ) -> CallResult {
        let (selector, callback_input) = match &mut self.contract {
            StubContract::Echo => return Ok(input.to_vec()),
            StubContract::Revert => return Err(EnvError::CalleeReverted.into()),
            StubContract::Trap => return Err(EnvError::CalleeTrapped.into()),
            StubContract::Counter { count } => {
                *count += 1;
                return Ok(count.to_be_bytes().to_vec());
            }
            StubContract::CallBack { selector, input } => (*selector, input.clone()),
        };

        log::debug!("{} calling back into {}", self.address, caller);

        let request = CallRequest {
            caller: self.address.clone(),
            target: caller.clone(),
            selector,
            input: callback_input,
            transferred_value: 0,
            gas_limit: 0,
            flags: CallFlags::empty(),
        };

        env.call(self, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multisig::MultisigError;
    use crate::runtime::Host;

    fn run(contract: StubContract, input: &[u8]) -> (CallResult, StubContract) {
        let mut host = Host::new();
        let mut instance = StubInstance::new("0xstub".into(), contract);
        let result = instance.handle_message(&"alice".into(), [0; 4], input, &mut host);
        (result, instance.into_contract())
    }

    #[test]
    fn test_echo() {
        let (result, _) = run(StubContract::Echo, b"hello");
        assert_eq!(result, Ok(b"hello".to_vec()));
    }

    #[test]
    fn test_revert_and_trap() {
        let (result, _) = run(StubContract::Revert, &[]);
        assert_eq!(
            result,
            Err(MultisigError::EnvExecutionFailed(EnvError::CalleeReverted))
        );

        let (result, _) = run(StubContract::Trap, &[]);
        assert_eq!(
            result,
            Err(MultisigError::EnvExecutionFailed(EnvError::CalleeTrapped))
        );
    }

    #[test]
    fn test_counter_increments() {
        let (result, contract) = run(StubContract::Counter { count: 41 }, &[]);

        assert_eq!(result, Ok(42u64.to_be_bytes().to_vec()));
        assert_eq!(contract, StubContract::Counter { count: 42 });
    }

    #[test]
    fn test_callback_into_plain_account() {
        let contract = StubContract::CallBack {
            selector: [1, 2, 3, 4],
            input: vec![],
        };
        let (result, _) = run(contract, &[]);

        assert_eq!(
            result,
            Err(MultisigError::EnvExecutionFailed(EnvError::NotCallable))
        );
    }

    #[test]
    fn test_gas_costs() {
        assert!(StubContract::CallBack {
            selector: [0; 4],
            input: vec![]
        }
        .gas_cost()
            > StubContract::Echo.gas_cost());
        assert_eq!(StubContract::Trap.gas_cost(), 0);
        assert_eq!(StubContract::Counter { count: 0 }.name(), "counter");
    }
}
