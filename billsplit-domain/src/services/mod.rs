pub mod ledger;
pub mod report;

pub use ledger::SplitLedger;
pub use report::{build_report, ParticipantReport, PurchasedItem, Report};
