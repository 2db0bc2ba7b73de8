#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod ports;
pub mod service;
pub mod session;

pub use error::{ReceiptReadError, SessionError};
pub use model::{ParsedReceipt, ReceiptImage, SessionId};
pub use ports::ReceiptReader;
pub use service::SplitService;
pub use session::{BillSession, SessionStore};
