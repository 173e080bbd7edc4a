//! Quorum evaluation
//!
//! Approvals and rejections are independent monotone counters. A
//! transaction executes once approvals reach the threshold and is cancelled
//! once the owners that have not rejected can no longer reach it.

use crate::multisig::transaction::TxResult;
use serde::{Deserialize, Serialize};

/// Where a pending transaction stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuorumStatus {
    /// Approvals reached the threshold
    Reached,
    /// Still undecided
    Pending,
    /// Too many rejections for the threshold to ever be met
    Unreachable,
}

/// What an entry point did to the transaction it touched
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuorumOutcome {
    /// Still pending
    Pending,
    /// Dispatched and removed
    Executed(TxResult),
    /// Removed without dispatch
    Cancelled,
}

pub fn threshold_met(approvals: u8, threshold: u8) -> bool {
    approvals >= threshold
}

/// Whether the threshold is still reachable
///
/// Unreachable once `owners - rejections < threshold`.
pub fn threshold_can_be_met(rejections: u8, owner_count: usize, threshold: u8) -> bool {
    owner_count.saturating_sub(usize::from(rejections)) >= usize::from(threshold)
}

/// Classify a transaction from its vote counts and the current registry
pub fn evaluate(approvals: u8, rejections: u8, owner_count: usize, threshold: u8) -> QuorumStatus {
    if threshold_met(approvals, threshold) {
        QuorumStatus::Reached
    } else if !threshold_can_be_met(rejections, owner_count, threshold) {
        QuorumStatus::Unreachable
    } else {
        QuorumStatus::Pending
    }
}
