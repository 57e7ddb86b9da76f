#![warn(clippy::uninlined_format_args)]

pub mod reader;

pub use reader::{DEFAULT_SCOPE, TextLedgerReader};
