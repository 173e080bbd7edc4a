//! Engine limits

use crate::multisig::ledger::MAX_TRANSACTIONS;
use crate::multisig::registry::MAX_OWNERS;
use serde::{Deserialize, Serialize};

/// Storage bounds for one engine instance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest owner set accepted
    pub max_owners: usize,
    /// Largest number of simultaneously pending transactions
    pub max_transactions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_owners: MAX_OWNERS,
            max_transactions: MAX_TRANSACTIONS,
        }
    }
}
