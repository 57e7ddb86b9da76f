#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    Balance, ExpenseRecord, MemberId, Money, NOISE_THRESHOLD, Participant, ScopeId, ScopeLedger,
    Settlement, SettlementRecord, SettlementStatus, Split, Transfer,
};
pub use services::{
    BalanceCalculator, Balances, PairwiseLedger, TransferConstructor, equal_split, split_evenly,
};
