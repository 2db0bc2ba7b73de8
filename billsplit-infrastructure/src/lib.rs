#![warn(clippy::uninlined_format_args)]

pub mod ocr;
pub mod parser;

pub use ocr::OcrsReceiptReader;
pub use parser::parse_receipt_text;
