#![warn(clippy::uninlined_format_args)]

pub mod allocator;
pub mod error;
pub mod model;
pub mod services;

pub use allocator::IdSequence;
pub use error::{LedgerError, ReceiptError, ReportError};
pub use model::{
    Claim, ClaimId, Group, Item, ItemDraft, ItemId, Money, Participant, ParticipantId, Receipt,
};
pub use services::{build_report, ParticipantReport, PurchasedItem, Report, SplitLedger};
