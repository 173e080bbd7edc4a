//! Multi-owner transaction authorization
//!
//! An M-of-N engine where any owner proposes an outgoing call, owners vote on
//! it, and the call is dispatched once M approvals are in. Enough rejections
//! to make M unreachable cancel it instead. Owner set and threshold changes go
//! through the same vote, as calls the engine makes to itself.
//!
//! # Example
//!
//! ```ignore
//! use mini_multisig::multisig::{Message, MultisigEngine, Transaction};
//! use mini_multisig::runtime::Host;
//!
//! // A 2-of-3 engine
//! let mut host = Host::new();
//! let mut engine = MultisigEngine::new(address, 2, vec![alice, bob, charlie])?;
//!
//! // Propose raising the threshold; alice's approval is implicit
//! let tx = Transaction::self_call(engine.address(), &Message::ChangeThreshold(3))?;
//! let tx_id = engine.propose_tx(&alice, tx, &mut host)?;
//!
//! // Second approval executes it
//! engine.approve_tx(&bob, tx_id, &mut host)?;
//! ```

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod events;
pub mod governance;
pub mod ledger;
pub mod quorum;
pub mod registry;
pub mod transaction;

pub use config::EngineConfig;
pub use dispatch::dispatch;
pub use engine::MultisigEngine;
pub use error::{MultisigError, MultisigResult};
pub use events::{Event, EventLog, EventRecord};
pub use governance::{selector_for, Message};
pub use ledger::{TransactionLedger, MAX_TRANSACTIONS};
pub use quorum::{QuorumOutcome, QuorumStatus};
pub use registry::{OwnerRegistry, MAX_OWNERS};
pub use transaction::{Balance, PendingTx, Selector, Transaction, TxId, TxResult, Vote};
