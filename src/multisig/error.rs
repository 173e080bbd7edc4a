//! Errors returned by the authorization engine

use crate::runtime::EnvError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to multisig operations
///
/// Every variant is local and returned synchronously to the caller of the
/// entry point that triggered it. They also travel inside
/// [`TxResult::Failed`](crate::multisig::TxResult) when a dispatched call fails.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultisigError {
    #[error("Execution environment error: {0}")]
    EnvExecutionFailed(EnvError),
    #[error("The owners list cannot be empty")]
    OwnersCantBeEmpty,
    #[error("The threshold cannot be zero")]
    ThresholdCantBeZero,
    #[error("The threshold cannot be greater than the number of owners")]
    ThresholdGreaterThanOwners,
    #[error("Caller is not authorized for this entry point")]
    Unauthorized,
    #[error("Maximum number of owners reached")]
    MaxOwnersReached,
    #[error("Owner already exists")]
    OwnerAlreadyExists,
    #[error("Account is not an owner")]
    NotOwner,
    #[error("Maximum number of active transactions reached")]
    MaxTransactionsReached,
    #[error("Transaction id sequence overflowed")]
    TxIdOverflow,
    #[error("Caller has already voted on this transaction")]
    AlreadyVoted,
    #[error("Invalid transaction id")]
    InvalidTxId,
    #[error("Transfer failed")]
    TransferFailed,
    #[error("Invalid message input: {0}")]
    InvalidInput(String),
}

impl From<EnvError> for MultisigError {
    fn from(err: EnvError) -> Self {
        MultisigError::EnvExecutionFailed(err)
    }
}

/// Result type for engine operations
pub type MultisigResult<T> = Result<T, MultisigError>;
