//! Engine factory
//!
//! Builds engine instances at addresses derived from their configuration and
//! keeps a record of every instantiation.

use crate::crypto::{multisig_address, AccountId};
use crate::multisig::{EngineConfig, MultisigEngine, MultisigResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Record of one instantiation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMultisig {
    pub address: AccountId,
    pub deployer: AccountId,
    pub threshold: u8,
    pub owners: Vec<AccountId>,
    pub created_at: DateTime<Utc>,
}

/// Creates engines and remembers what it created
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MultisigFactory {
    /// Limits given to every new engine
    #[serde(default)]
    config: EngineConfig,
    instances: Vec<NewMultisig>,
}

impl MultisigFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            instances: Vec::new(),
        }
    }

    /// Build a new engine
    ///
    /// The same threshold, owner set and salt always yield the same address.
    ///
    /// # Errors
    /// Returns error if the engine parameters are invalid
    pub fn instantiate(
        &mut self,
        deployer: &AccountId,
        threshold: u8,
        owners: Vec<AccountId>,
        salt: &[u8],
    ) -> MultisigResult<MultisigEngine> {
        let address = Self::address_for(threshold, &owners, salt);
        let engine =
            MultisigEngine::with_config(address.clone(), threshold, owners, self.config.clone())?;

        self.instances.push(NewMultisig {
            address,
            deployer: deployer.clone(),
            threshold,
            owners: engine.get_owners(),
            created_at: engine.created_at,
        });

        Ok(engine)
    }

    /// Every instantiation, oldest first
    pub fn instances(&self) -> &[NewMultisig] {
        &self.instances
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Address an instantiation with these parameters would get
    pub fn address_for(threshold: u8, owners: &[AccountId], salt: &[u8]) -> AccountId {
        multisig_address(threshold, owners, salt)
    }
}
