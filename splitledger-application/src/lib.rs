#![warn(clippy::uninlined_format_args)]

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod ports;
pub mod settlement_guard;

pub use config::{
    DEFAULT_DUPLICATE_WINDOW, DUPLICATE_WINDOW_ENV, EngineConfig, NOISE_THRESHOLD_ENV,
    parse_noise_threshold,
};
pub use engine::SettlementEngine;
pub use error::{ConfigError, DuplicateSettlement, LoadError};
pub use model::{CrossScopeSettlement, Ledger, ScopeSettlement, SettlementDiagnostics};
pub use ports::{LedgerReader, MemberDirectory};
pub use settlement_guard::{SettlementDeduplicator, SettlementKey};
