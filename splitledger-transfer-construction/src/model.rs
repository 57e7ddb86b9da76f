/// Net balance of one person in integer minor units
/// (positive: is owed money, negative: owes money).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonBalance<Id = u64> {
    pub id: Id,
    pub balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment<Id = u64> {
    pub from: Id,
    pub to: Id,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStrategy {
    /// Two-pointer descending merge of debtors and creditors.
    Greedy,
    /// Exact-amount pairing first, then the greedy merge on the leftovers.
    ExactMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    noise_threshold: i64,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self { noise_threshold: 1 }
    }
}

impl TransferOptions {
    /// Balances with a magnitude below `noise_threshold` are treated as
    /// settled. Values below 1 are stored as 1.
    pub fn with_noise_threshold(mut self, noise_threshold: i64) -> Self {
        self.noise_threshold = noise_threshold.max(1);
        self
    }

    pub fn noise_threshold(self) -> i64 {
        self.noise_threshold
    }
}

/// Outcome of [`construct_settlement_transfers`](crate::construct_settlement_transfers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan<Id = u64> {
    pub payments: Vec<Payment<Id>>,
    pub strategy: TransferStrategy,
    pub greedy_count: usize,
    pub optimized_count: usize,
}

impl<Id> TransferPlan<Id> {
    /// How many transfers the chosen plan saves compared to the greedy merge.
    pub fn transfers_saved(&self) -> usize {
        self.greedy_count.saturating_sub(self.payments.len())
    }

    pub fn total_amount(&self) -> i64 {
        self.payments.iter().map(|payment| payment.amount).sum()
    }
}
