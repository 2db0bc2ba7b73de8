use thiserror::Error;

use crate::model::{ItemId, Money, ParticipantId};

/// Rejected rows during receipt construction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReceiptError {
    #[error("item {name:?} has a count of zero")]
    ZeroCount { name: String },
    #[error("item {name:?} has a negative total price")]
    NegativePrice { name: String },
}

/// Contract violations on ledger mutation calls. Always recoverable values:
/// one bad input must never take down a process serving other sessions.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unknown item id {0}")]
    ItemNotFound(ItemId),
    #[error(
        "claim position {position} out of range for participant {participant} (sequence length {len})"
    )]
    PositionOutOfRange {
        participant: ParticipantId,
        position: usize,
        len: usize,
    },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The receipt has a zero subtotal but a nonzero grand total, and at
    /// least one participant holds a nonzero claim: there is no subtotal
    /// share to spread the total over.
    #[error("degenerate receipt: zero subtotal with grand total {total}")]
    DegenerateReceipt { total: Money },
}
