#![warn(clippy::uninlined_format_args)]

pub mod report_presenter;
pub mod text_table;

pub use report_presenter::{CurrencyFormat, ParticipantSection, ReportPresenter, ReportView};
pub use text_table::{Alignment, TextTableBuilder};
