pub mod balance_calculator;
pub mod equal_split;
pub mod pairwise_ledger;
pub mod transfer_constructor;

pub use balance_calculator::{BalanceCalculator, Balances};
pub use equal_split::{equal_split, split_evenly};
pub use pairwise_ledger::PairwiseLedger;
pub use transfer_constructor::TransferConstructor;
