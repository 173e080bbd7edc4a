//! Mini-Multisig: a multi-owner transaction authorization engine in Rust
//!
//! This crate provides an M-of-N authorization engine featuring:
//! - Owner registry with a quorum threshold
//! - Proposal ledger with bounded capacity and monotonic ids
//! - Approve/reject voting with automatic execution and cancellation
//! - Governance through self-calls that pass the same quorum
//! - An in-memory execution host with a reentrancy guard
//! - JSON persistence with rotating backups
//!
//! # Example
//!
//! ```rust
//! use mini_multisig::multisig::{Message, Transaction};
//! use mini_multisig::runtime::Host;
//!
//! let mut host = Host::new();
//! let engine = host
//!     .instantiate(
//!         &"deployer".into(),
//!         2,
//!         vec!["alice".into(), "bob".into(), "charlie".into()],
//!         b"",
//!     )
//!     .unwrap();
//!
//! // Alice proposes adding dave; her approval is implicit
//! let add_dave = Transaction::self_call(&engine, &Message::AddOwner("dave".into())).unwrap();
//! host.submit(&"alice".into(), &engine, &Message::ProposeTx(add_dave)).unwrap();
//!
//! // Bob's approval reaches the threshold and executes it
//! host.submit(&"bob".into(), &engine, &Message::ApproveTx(0)).unwrap();
//!
//! assert!(host.engine(&engine).unwrap().is_owner(&"dave".into()));
//! ```

pub mod cli;
pub mod crypto;
pub mod multisig;
pub mod runtime;
pub mod storage;

// Re-export commonly used types
pub use crypto::AccountId;
pub use multisig::{
    Event, Message, MultisigEngine, MultisigError, QuorumOutcome, Transaction, TxId, TxResult,
    Vote,
};
pub use runtime::{Environment, Host, MessageHandler, StubContract};
pub use storage::{Storage, StorageConfig};
