#![warn(clippy::uninlined_format_args)]

pub mod settlement_presenter;
mod strings;
pub mod text_table;

pub use settlement_presenter::{SettlementPresenter, SettlementView};
pub use text_table::{Alignment, TextTableBuilder};
