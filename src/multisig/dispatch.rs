//! Execution dispatcher
//!
//! Forwards an approved transaction to the environment as one outgoing call.
//! There are no retries: whatever comes back becomes the transaction's
//! [`TxResult`].

use crate::multisig::transaction::{Transaction, TxResult};
use crate::runtime::{CallRequest, Environment, MessageHandler};

/// Perform the call described by `tx` on behalf of `origin`
///
/// The reentrancy flag is passed through untouched; enforcing it is the
/// environment's job.
pub fn dispatch(
    origin: &mut dyn MessageHandler,
    tx: &Transaction,
    env: &mut dyn Environment,
) -> TxResult {
    let request = CallRequest::from_transaction(origin.address().clone(), tx);

    log::debug!(
        "Dispatching call {} -> {} (selector 0x{}, value {}, gas {}, reentry {})",
        request.caller,
        request.target,
        hex::encode(request.selector),
        request.transferred_value,
        request.gas_limit,
        request.allows_reentry()
    );

    match env.call(origin, request) {
        Ok(output) => TxResult::Success(output),
        Err(err) => {
            log::warn!("Call to {} failed: {}", tx.address, err);
            TxResult::Failed(err)
        }
    }
}
