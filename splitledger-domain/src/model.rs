use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use crate::services::split_evenly;

/// Integer amount of currency minor units (cents, paise, yen...).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub const fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub const fn amount(self) -> i64 {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Balances with a magnitude below this many minor units are treated as settled.
pub const NOISE_THRESHOLD: Money = Money::from_i64(1);

/// Opaque participant identifier. Ordering is byte-lexicographic.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub SmolStr);

impl MemberId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(pub SmolStr);

impl ScopeId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ScopeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: MemberId,
    pub display_name: SmolStr,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub member: MemberId,
    pub amount: Money,
}

/// One shared expense: `payer` covered the whole amount up front and each
/// split is one participant's share of it.
///
/// The splits are expected to add up to the transaction total. That is the
/// caller's responsibility and is not checked here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub payer: MemberId,
    pub splits: Vec<Split>,
}

impl ExpenseRecord {
    pub fn new(payer: MemberId, splits: Vec<Split>) -> Self {
        Self { payer, splits }
    }

    /// Splits `total` evenly among `members`, handing the remainder out one
    /// unit at a time in the given order.
    pub fn even(payer: MemberId, total: Money, members: &[MemberId]) -> Self {
        Self {
            payer,
            splits: split_evenly(total, members),
        }
    }

    pub fn total(&self) -> Money {
        self.splits.iter().map(|split| split.amount).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Completed,
    Confirmed,
    Rejected,
}

impl SettlementStatus {
    /// Whether a settlement in this status has already moved money.
    pub fn is_effective(self) -> bool {
        matches!(self, Self::Completed | Self::Confirmed)
    }
}

/// A real-world payment recorded outside the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
    pub status: SettlementStatus,
}

impl SettlementRecord {
    pub fn completed(from: MemberId, to: MemberId, amount: Money) -> Self {
        Self {
            from,
            to,
            amount,
            status: SettlementStatus::Completed,
        }
    }
}

/// All records belonging to one scope (group, trip...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeLedger {
    pub scope: ScopeId,
    pub expenses: Vec<ExpenseRecord>,
    pub settlements: Vec<SettlementRecord>,
}

impl ScopeLedger {
    pub fn new(scope: ScopeId) -> Self {
        Self {
            scope,
            expenses: Vec::new(),
            settlements: Vec::new(),
        }
    }

    pub fn with_expense(mut self, expense: ExpenseRecord) -> Self {
        self.expenses.push(expense);
        self
    }

    pub fn with_settlement(mut self, settlement: SettlementRecord) -> Self {
        self.settlements.push(settlement);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub member: MemberId,
    pub paid: Money,
    pub owes: Money,
    pub balance: Money,
}

impl Balance {
    pub fn new(member: MemberId, paid: Money, owes: Money) -> Self {
        Self {
            member,
            paid,
            owes,
            balance: paid - owes,
        }
    }

    pub fn zero(member: MemberId) -> Self {
        Self::new(member, Money::ZERO, Money::ZERO)
    }

    pub fn is_settled(&self, noise_threshold: Money) -> bool {
        self.balance.abs() < noise_threshold
    }
}

/// `from` should pay `to` this amount.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub transfers: Vec<Transfer>,
    pub greedy_transfer_count: usize,
    pub optimized_transfer_count: usize,
}

impl Settlement {
    pub fn transfers_saved(&self) -> usize {
        self.greedy_transfer_count
            .saturating_sub(self.transfers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::completed(SettlementStatus::Completed, true)]
    #[case::confirmed(SettlementStatus::Confirmed, true)]
    #[case::pending(SettlementStatus::Pending, false)]
    #[case::rejected(SettlementStatus::Rejected, false)]
    fn only_completed_or_confirmed_settlements_are_effective(
        #[case] status: SettlementStatus,
        #[case] expected: bool,
    ) {
        assert_eq!(status.is_effective(), expected);
    }

    #[test]
    fn balance_is_paid_minus_owes() {
        let balance = Balance::new(
            MemberId::new("alice"),
            Money::from_i64(900),
            Money::from_i64(300),
        );
        assert_eq!(balance.balance, Money::from_i64(600));
        assert!(!balance.is_settled(NOISE_THRESHOLD));
        assert!(Balance::zero(MemberId::new("bob")).is_settled(NOISE_THRESHOLD));
    }

    #[test]
    fn even_expense_conserves_total() {
        let members = [MemberId::new("a"), MemberId::new("b"), MemberId::new("c")];
        let expense = ExpenseRecord::even(MemberId::new("a"), Money::from_i64(100), &members);
        assert_eq!(expense.total(), Money::from_i64(100));
        assert_eq!(expense.splits[0].amount, Money::from_i64(34));
        assert_eq!(expense.splits[2].amount, Money::from_i64(33));
    }

    #[test]
    fn member_ids_order_lexicographically() {
        assert!(MemberId::new("alice") < MemberId::new("bob"));
        assert!(MemberId::new("Bob") < MemberId::new("alice"));
    }

    #[test]
    fn money_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Money::from_i64(-250)).expect("serialize");
        assert_eq!(json, "-250");
        let status = serde_json::to_string(&SettlementStatus::Confirmed).expect("serialize");
        assert_eq!(status, "\"confirmed\"");
    }
}
