use crate::{error::ReceiptReadError, model::ParsedReceipt, model::ReceiptImage};

/// Narrow boundary to the external receipt-reading capability.
///
/// One blocking operation: once invoked it runs to completion or reports
/// failure; there is no cancellation. Concrete backends (OCR engines, vision
/// models) are interchangeable implementations selected by configuration.
pub trait ReceiptReader: Send + Sync {
    fn read(&self, image: &ReceiptImage<'_>) -> Result<ParsedReceipt, ReceiptReadError>;
}
