use std::time::Duration;

use splitledger_domain::{MemberId, Money, ScopeId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer number of minor units (got '{value}')")]
    InvalidNoiseThreshold { key: &'static str, value: String },
    #[error("{key} must be a whole number of seconds (got '{value}')")]
    InvalidDuplicateWindow { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Settlement of {amount} from {from} to {to} in scope '{scope}' was already recorded {elapsed:?} ago"
)]
pub struct DuplicateSettlement {
    pub scope: ScopeId,
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("Syntax error at line {line}: {detail}")]
    SyntaxError { line: usize, detail: String },
    #[error("Undefined member '{name}' at line {line}.")]
    UndefinedMember { name: String, line: usize },
    #[error("Member '{name}' is declared twice (line {line}).")]
    DuplicateMember { name: String, line: usize },
    #[error("Shares at line {line} add up to {shares}, but the expense total is {total}.")]
    SplitTotalMismatch { line: usize, total: u64, shares: u64 },
    #[error("Amount {amount} at line {line} is too large.")]
    AmountOverflow { amount: u64, line: usize },
}
