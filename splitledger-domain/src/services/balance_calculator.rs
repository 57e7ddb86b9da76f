use indexmap::IndexMap;

use crate::model::{
    Balance, ExpenseRecord, MemberId, Money, ScopeLedger, SettlementRecord, Transfer,
};

/// Net balance per participant, in first-seen order.
///
/// First-seen order is the input order used to break ties between equal
/// amounts when transfers are constructed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Balances {
    entries: IndexMap<MemberId, Balance>,
}

impl Balances {
    pub fn get(&self, member: &MemberId) -> Option<&Balance> {
        self.entries.get(member)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Balance> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all net balances. Zero whenever the inputs are well formed.
    pub fn total(&self) -> Money {
        self.iter().map(|balance| balance.balance).sum()
    }

    pub fn is_settled(&self, noise_threshold: Money) -> bool {
        self.iter().all(|balance| balance.is_settled(noise_threshold))
    }

    pub fn into_vec(self) -> Vec<Balance> {
        self.entries.into_values().collect()
    }

    /// Balances after every transfer has been paid, using the same sign
    /// convention as a completed settlement.
    pub fn apply_transfers(self, transfers: &[Transfer]) -> Self {
        transfers.iter().fold(self, |balances, transfer| {
            balances.record_payment(&transfer.from, &transfer.to, transfer.amount)
        })
    }

    fn entry(&mut self, member: &MemberId) -> &mut Balance {
        self.entries
            .entry(member.clone())
            .or_insert_with(|| Balance::zero(member.clone()))
    }

    fn seed(mut self, member: &MemberId) -> Self {
        self.entry(member);
        self
    }

    fn add_paid(mut self, member: &MemberId, amount: Money) -> Self {
        let entry = self.entry(member);
        entry.paid += amount;
        entry.balance = entry.paid - entry.owes;
        self
    }

    fn add_owes(mut self, member: &MemberId, amount: Money) -> Self {
        let entry = self.entry(member);
        entry.owes += amount;
        entry.balance = entry.paid - entry.owes;
        self
    }

    fn apply_expense(self, expense: &ExpenseRecord) -> Self {
        let balances = self.add_paid(&expense.payer, expense.total());
        expense
            .splits
            .iter()
            .fold(balances, |balances, split| {
                balances.add_owes(&split.member, split.amount)
            })
    }

    fn record_payment(self, from: &MemberId, to: &MemberId, amount: Money) -> Self {
        self.add_paid(from, amount).add_owes(to, amount)
    }

    fn apply_settlement(self, settlement: &SettlementRecord) -> Self {
        if !settlement.status.is_effective() {
            return self;
        }
        self.record_payment(&settlement.from, &settlement.to, settlement.amount)
    }
}

impl<'a> IntoIterator for &'a Balances {
    type Item = &'a Balance;
    type IntoIter = indexmap::map::Values<'a, MemberId, Balance>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

/// Folds expense and settlement records into per-participant balances.
pub struct BalanceCalculator;

impl BalanceCalculator {
    pub fn calculate(
        &self,
        expenses: &[ExpenseRecord],
        settlements: &[SettlementRecord],
    ) -> Balances {
        self.calculate_with_members(&[], expenses, settlements)
    }

    /// Like [`calculate`](Self::calculate), but `members` are listed first and
    /// appear even when they have no activity.
    pub fn calculate_with_members(
        &self,
        members: &[MemberId],
        expenses: &[ExpenseRecord],
        settlements: &[SettlementRecord],
    ) -> Balances {
        let seeded = members.iter().fold(Balances::default(), Balances::seed);
        let after_expenses = expenses.iter().fold(seeded, Balances::apply_expense);
        settlements
            .iter()
            .fold(after_expenses, Balances::apply_settlement)
    }

    /// Per-participant totals over several scopes. Only a view: these
    /// balances must not be netted against each other across scopes.
    pub fn calculate_scopes(&self, scopes: &[ScopeLedger]) -> Balances {
        scopes.iter().fold(Balances::default(), |balances, scope| {
            let balances = scope
                .expenses
                .iter()
                .fold(balances, Balances::apply_expense);
            scope
                .settlements
                .iter()
                .fold(balances, Balances::apply_settlement)
        })
    }
}
