use billsplit_domain::{LedgerError, ReceiptError, ReportError};
use thiserror::Error;

use crate::model::SessionId;

/// Failure of the external receipt reader. Surfaced to the caller unmodified
/// and never retried automatically; retry is a user-initiated re-invocation.
#[derive(Debug, Error)]
pub enum ReceiptReadError {
    #[error("failed to load reader model from {path}")]
    ModelLoad {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to initialize the reader engine")]
    EngineInit {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("could not decode the uploaded image")]
    ImageDecode {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("reader failed while scanning the image")]
    ScanFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("no item rows could be recognized on the receipt")]
    NoItemsFound,
    #[error("no grand total could be recognized on the receipt")]
    TotalNotFound,
    #[error("multiple conflicting grand-total candidates were recognized")]
    TotalAmbiguous,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown session {0}")]
    SessionNotFound(SessionId),
    #[error("no receipt has been accepted for this session yet")]
    NoReceipt,
    #[error(transparent)]
    Receipt(#[from] ReceiptError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Report(#[from] ReportError),
}
