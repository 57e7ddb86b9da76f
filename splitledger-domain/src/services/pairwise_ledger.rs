use std::collections::BTreeMap;

use crate::model::{ExpenseRecord, MemberId, Money, ScopeLedger, SettlementRecord, Transfer};

/// Exact, un-netted debt between every pair of participants that actually
/// shared an expense or a settlement.
///
/// Each unordered pair has one signed accumulator keyed by `(smaller, larger)`
/// member id. A positive value means the smaller id owes the larger one.
///
/// Unlike balance netting, this never produces a transfer between two people
/// who did not transact with each other, which is what makes it safe to
/// combine scopes whose memberships differ.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairwiseLedger {
    pairs: BTreeMap<(MemberId, MemberId), Money>,
}

impl PairwiseLedger {
    pub fn from_records(expenses: &[ExpenseRecord], settlements: &[SettlementRecord]) -> Self {
        let ledger = expenses
            .iter()
            .fold(Self::default(), PairwiseLedger::with_expense);
        settlements
            .iter()
            .fold(ledger, PairwiseLedger::with_settlement)
    }

    pub fn from_scopes<'a, I>(scopes: I) -> Self
    where
        I: IntoIterator<Item = &'a ScopeLedger>,
    {
        scopes
            .into_iter()
            .fold(Self::default(), |ledger, scope| {
                let ledger = scope
                    .expenses
                    .iter()
                    .fold(ledger, PairwiseLedger::with_expense);
                scope
                    .settlements
                    .iter()
                    .fold(ledger, PairwiseLedger::with_settlement)
            })
    }

    /// Signed amount `debtor` owes `creditor`; negative when the debt runs the
    /// other way.
    pub fn net_debt(&self, debtor: &MemberId, creditor: &MemberId) -> Money {
        if debtor < creditor {
            self.pairs
                .get(&(debtor.clone(), creditor.clone()))
                .copied()
                .unwrap_or(Money::ZERO)
        } else {
            -self
                .pairs
                .get(&(creditor.clone(), debtor.clone()))
                .copied()
                .unwrap_or(Money::ZERO)
        }
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// One transfer per pair whose net debt reaches `noise_threshold`, in
    /// canonical pair order.
    pub fn transfers(&self, noise_threshold: Money) -> Vec<Transfer> {
        self.pairs
            .iter()
            .filter_map(|((lower, upper), net)| pair_transfer(lower, upper, *net, noise_threshold))
            .collect()
    }

    /// The subset of [`transfers`](Self::transfers) that `member` pays or receives.
    pub fn transfers_involving(&self, member: &MemberId, noise_threshold: Money) -> Vec<Transfer> {
        self.pairs
            .iter()
            .filter(|((lower, upper), _)| lower == member || upper == member)
            .filter_map(|((lower, upper), net)| pair_transfer(lower, upper, *net, noise_threshold))
            .collect()
    }

    fn with_expense(self, expense: &ExpenseRecord) -> Self {
        expense
            .splits
            .iter()
            .filter(|split| split.member != expense.payer)
            .fold(self, |ledger, split| {
                ledger.record_debt(&split.member, &expense.payer, split.amount)
            })
    }

    fn with_settlement(self, settlement: &SettlementRecord) -> Self {
        if !settlement.status.is_effective() || settlement.from == settlement.to {
            return self;
        }
        // Paying reduces what `from` owes `to`.
        self.record_debt(&settlement.from, &settlement.to, -settlement.amount)
    }

    fn record_debt(mut self, debtor: &MemberId, creditor: &MemberId, amount: Money) -> Self {
        let (key, signed) = if debtor < creditor {
            ((debtor.clone(), creditor.clone()), amount)
        } else {
            ((creditor.clone(), debtor.clone()), -amount)
        };
        *self.pairs.entry(key).or_insert(Money::ZERO) += signed;
        self
    }
}

fn pair_transfer(
    lower: &MemberId,
    upper: &MemberId,
    net: Money,
    noise_threshold: Money,
) -> Option<Transfer> {
    if net.abs() < noise_threshold || net.is_zero() {
        return None;
    }
    let (from, to) = if net.is_positive() {
        (lower, upper)
    } else {
        (upper, lower)
    };
    Some(Transfer {
        from: from.clone(),
        to: to.clone(),
        amount: net.abs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NOISE_THRESHOLD, ScopeId, SettlementStatus};

    fn id(name: &str) -> MemberId {
        MemberId::new(name)
    }

    fn even(payer: &str, total: i64, members: &[&str]) -> ExpenseRecord {
        let members: Vec<MemberId> = members.iter().copied().map(id).collect();
        ExpenseRecord::even(id(payer), Money::from_i64(total), &members)
    }

    fn transfer(from: &str, to: &str, amount: i64) -> Transfer {
        Transfer {
            from: id(from),
            to: id(to),
            amount: Money::from_i64(amount),
        }
    }

    #[test]
    fn split_member_owes_payer() {
        let ledger = PairwiseLedger::from_records(&[even("b", 100, &["a", "b"])], &[]);
        assert_eq!(ledger.net_debt(&id("a"), &id("b")), Money::from_i64(50));
        assert_eq!(ledger.net_debt(&id("b"), &id("a")), Money::from_i64(-50));
        assert_eq!(ledger.transfers(NOISE_THRESHOLD), vec![transfer("a", "b", 50)]);
    }

    #[test]
    fn opposite_debts_net_within_the_pair() {
        let scope1 = ScopeLedger::new(ScopeId::new("one")).with_expense(even("a", 100, &["a", "b"]));
        let scope2 = ScopeLedger::new(ScopeId::new("two")).with_expense(even("b", 60, &["a", "b"]));

        let ledger = PairwiseLedger::from_scopes([&scope1, &scope2]);

        assert_eq!(ledger.pair_count(), 1);
        assert_eq!(ledger.transfers(NOISE_THRESHOLD), vec![transfer("b", "a", 20)]);
    }

    #[test]
    fn never_routes_debt_through_a_third_party() {
        // a covers b in one group, b covers c in another: c never dealt with a.
        let scope1 = ScopeLedger::new(ScopeId::new("one")).with_expense(even("a", 100, &["b"]));
        let scope2 = ScopeLedger::new(ScopeId::new("two")).with_expense(even("b", 100, &["c"]));

        let transfers = PairwiseLedger::from_scopes([&scope1, &scope2]).transfers(NOISE_THRESHOLD);

        assert_eq!(
            transfers,
            vec![transfer("b", "a", 100), transfer("c", "b", 100)]
        );
        assert!(
            !transfers
                .iter()
                .any(|t| (t.from == id("c") && t.to == id("a")) || (t.from == id("a") && t.to == id("c")))
        );
    }

    #[test]
    fn effective_settlements_reduce_the_pair() {
        let ledger = PairwiseLedger::from_records(
            &[even("a", 100, &["b"])],
            &[
                SettlementRecord::completed(id("b"), id("a"), Money::from_i64(30)),
                SettlementRecord {
                    from: id("b"),
                    to: id("a"),
                    amount: Money::from_i64(70),
                    status: SettlementStatus::Pending,
                },
            ],
        );
        assert_eq!(ledger.transfers(NOISE_THRESHOLD), vec![transfer("b", "a", 70)]);
    }

    #[test]
    fn fully_settled_pair_emits_nothing() {
        let ledger = PairwiseLedger::from_records(
            &[even("a", 100, &["b"])],
            &[SettlementRecord::completed(id("b"), id("a"), Money::from_i64(100))],
        );
        assert_eq!(ledger.pair_count(), 1);
        assert!(ledger.transfers(NOISE_THRESHOLD).is_empty());
    }

    #[test]
    fn self_splits_and_self_settlements_are_ignored() {
        let ledger = PairwiseLedger::from_records(
            &[even("a", 100, &["a"])],
            &[SettlementRecord::completed(id("a"), id("a"), Money::from_i64(5))],
        );
        assert_eq!(ledger.pair_count(), 0);
    }

    #[test]
    fn transfers_involving_filters_by_member() {
        let ledger = PairwiseLedger::from_records(
            &[even("a", 100, &["b"]), even("c", 40, &["d"])],
            &[],
        );
        assert_eq!(
            ledger.transfers_involving(&id("d"), NOISE_THRESHOLD),
            vec![transfer("d", "c", 40)]
        );
    }

    #[test]
    fn threshold_drops_small_pairs() {
        let ledger = PairwiseLedger::from_records(
            &[even("a", 3, &["b"]), even("c", 40, &["d"])],
            &[],
        );
        assert_eq!(
            ledger.transfers(Money::from_i64(5)),
            vec![transfer("d", "c", 40)]
        );
    }
}
