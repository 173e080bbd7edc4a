//! Engine notifications
//!
//! Every state transition appends an [`Event`] to the engine's ordered log.
//! Collaborators poll the log by sequence number or drain it; delivery is
//! not the engine's concern.

use crate::crypto::AccountId;
use crate::multisig::transaction::{Balance, Selector, TxId, TxResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A notification emitted by the engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    ThresholdChanged {
        threshold: u8,
    },
    OwnerAdded {
        owner: AccountId,
    },
    OwnerRemoved {
        owner: AccountId,
    },
    TransactionProposed {
        tx_id: TxId,
        contract_address: AccountId,
        selector: Selector,
        input: Vec<u8>,
        transferred_value: Balance,
        gas_limit: u64,
        allow_reentry: bool,
    },
    Approve {
        tx_id: TxId,
        owner: AccountId,
    },
    Reject {
        tx_id: TxId,
        owner: AccountId,
    },
    TransactionExecuted {
        tx_id: TxId,
        result: TxResult,
    },
    TransactionCancelled {
        tx_id: TxId,
    },
    TransactionRemoved {
        tx_id: TxId,
    },
    Transfer {
        to: AccountId,
        value: Balance,
    },
}

impl Event {
    /// Short name used in listings
    pub fn name(&self) -> &'static str {
        match self {
            Event::ThresholdChanged { .. } => "ThresholdChanged",
            Event::OwnerAdded { .. } => "OwnerAdded",
            Event::OwnerRemoved { .. } => "OwnerRemoved",
            Event::TransactionProposed { .. } => "TransactionProposed",
            Event::Approve { .. } => "Approve",
            Event::Reject { .. } => "Reject",
            Event::TransactionExecuted { .. } => "TransactionExecuted",
            Event::TransactionCancelled { .. } => "TransactionCancelled",
            Event::TransactionRemoved { .. } => "TransactionRemoved",
            Event::Transfer { .. } => "Transfer",
        }
    }
}

/// An event with its position in the log
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0
    pub seq: u64,
    /// When the event was emitted
    pub timestamp: DateTime<Utc>,
    pub event: Event,
}

/// Ordered event log
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
    next_seq: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&mut self, event: Event) {
        log::debug!("event #{}: {:?}", self.next_seq, event);

        self.records.push(EventRecord {
            seq: self.next_seq,
            timestamp: Utc::now(),
            event,
        });
        self.next_seq += 1;
    }

    /// Records with a sequence number at or after `seq`
    pub fn since(&self, seq: u64) -> &[EventRecord] {
        let start = self.records.partition_point(|r| r.seq < seq);
        &self.records[start..]
    }

    /// Events in emission order
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.records.iter().map(|r| &r.event)
    }

    pub fn last(&self) -> Option<&Event> {
        self.records.last().map(|r| &r.event)
    }

    /// Result of the most recently executed transaction
    pub fn last_executed(&self) -> Option<&TxResult> {
        self.records.iter().rev().find_map(|r| match &r.event {
            Event::TransactionExecuted { result, .. } => Some(result),
            _ => None,
        })
    }

    /// Take every buffered record, keeping the sequence counter
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    /// Sequence number the next event will get
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_numbers() {
        let mut log = EventLog::new();
        log.push(Event::ThresholdChanged { threshold: 2 });
        log.push(Event::TransactionRemoved { tx_id: 0 });

        let seqs: Vec<u64> = log.since(0).iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![0, 1]);
        assert_eq!(log.since(1).len(), 1);
        assert!(log.since(2).is_empty());
    }

    #[test]
    fn test_drain_keeps_counter() {
        let mut log = EventLog::new();
        log.push(Event::OwnerAdded {
            owner: "dave".into(),
        });

        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert!(log.is_empty());

        log.push(Event::OwnerRemoved {
            owner: "dave".into(),
        });
        assert_eq!(log.since(0)[0].seq, 1);
        assert_eq!(log.next_seq(), 2);
    }

    #[test]
    fn test_event_names() {
        let event = Event::TransactionCancelled { tx_id: 3 };
        assert_eq!(event.name(), "TransactionCancelled");
        assert_eq!(
            Event::Transfer {
                to: "bob".into(),
                value: 1
            }
            .name(),
            "Transfer"
        );
    }
}
