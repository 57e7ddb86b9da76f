#![warn(clippy::uninlined_format_args)]

//! Transfer construction over integer balances.
//!
//! Two heuristics are provided. Neither is guaranteed to find the minimum
//! number of transfers (that problem is NP-hard in general):
//!
//! - [`greedy_transfers`]: pairs the largest remaining debtor with the largest
//!   remaining creditor until one side is exhausted.
//! - [`exact_match_transfers`]: first closes out debtor/creditor pairs whose
//!   amounts are identical, then runs the greedy merge on what is left.
//!
//! [`construct_settlement_transfers`] runs both and keeps the shorter plan.

mod model;

pub use model::{Payment, PersonBalance, TransferOptions, TransferPlan, TransferStrategy};

#[derive(Clone, Copy, Debug)]
struct Party {
    index: usize,
    remaining: i64,
}

struct Partition {
    debtors: Vec<Party>,
    creditors: Vec<Party>,
}

impl Partition {
    fn from_people<Id>(people: &[PersonBalance<Id>], threshold: i64) -> Self {
        let mut debtors = Vec::new();
        let mut creditors = Vec::new();
        for (index, person) in people.iter().enumerate() {
            if person.balance >= threshold {
                creditors.push(Party {
                    index,
                    remaining: person.balance,
                });
            } else if person.balance <= -threshold {
                debtors.push(Party {
                    index,
                    remaining: person.balance.saturating_neg(),
                });
            }
        }

        // Stable sort: equal amounts keep their input order.
        debtors.sort_by(|lhs, rhs| rhs.remaining.cmp(&lhs.remaining));
        creditors.sort_by(|lhs, rhs| rhs.remaining.cmp(&lhs.remaining));

        Self { debtors, creditors }
    }

    fn debt_mass(&self) -> i64 {
        self.debtors.iter().map(|party| party.remaining).sum()
    }

    fn credit_mass(&self) -> i64 {
        self.creditors.iter().map(|party| party.remaining).sum()
    }
}

fn payment<Id: Clone>(
    people: &[PersonBalance<Id>],
    debtor: Party,
    creditor: Party,
    amount: i64,
) -> Payment<Id> {
    Payment {
        from: people[debtor.index].id.clone(),
        to: people[creditor.index].id.clone(),
        amount,
    }
}

fn merge_descending<Id: Clone>(
    people: &[PersonBalance<Id>],
    debtors: &mut [Party],
    creditors: &mut [Party],
    payments: &mut Vec<Payment<Id>>,
) {
    let (mut d, mut c) = (0, 0);
    while d < debtors.len() && c < creditors.len() {
        let amount = debtors[d].remaining.min(creditors[c].remaining);
        if amount > 0 {
            payments.push(payment(people, debtors[d], creditors[c], amount));
        }
        debtors[d].remaining -= amount;
        creditors[c].remaining -= amount;
        if debtors[d].remaining == 0 {
            d += 1;
        }
        if creditors[c].remaining == 0 {
            c += 1;
        }
    }
}

/// Greedy two-pointer merge. Produces at most `debtors + creditors - 1` payments.
pub fn greedy_transfers<Id: Clone>(
    people: &[PersonBalance<Id>],
    options: TransferOptions,
) -> Vec<Payment<Id>> {
    let Partition {
        mut debtors,
        mut creditors,
    } = Partition::from_people(people, options.noise_threshold());

    let mut payments = Vec::with_capacity(debtors.len() + creditors.len());
    merge_descending(people, &mut debtors, &mut creditors, &mut payments);
    payments
}

/// Exact-amount elimination followed by the greedy merge on the remainder.
///
/// The elimination pass is quadratic in the number of non-settled people.
pub fn exact_match_transfers<Id: Clone>(
    people: &[PersonBalance<Id>],
    options: TransferOptions,
) -> Vec<Payment<Id>> {
    let Partition {
        mut debtors,
        mut creditors,
    } = Partition::from_people(people, options.noise_threshold());

    let mut payments = Vec::with_capacity(debtors.len() + creditors.len());

    for debtor in debtors.iter_mut() {
        let Some(creditor) = creditors
            .iter_mut()
            .find(|creditor| creditor.remaining == debtor.remaining)
        else {
            continue;
        };
        payments.push(payment(people, *debtor, *creditor, debtor.remaining));
        debtor.remaining = 0;
        creditor.remaining = 0;
    }

    debtors.retain(|party| party.remaining > 0);
    creditors.retain(|party| party.remaining > 0);
    merge_descending(people, &mut debtors, &mut creditors, &mut payments);
    payments
}

/// Runs both heuristics and keeps the plan with fewer payments.
/// Ties go to the exact-match plan.
pub fn construct_settlement_transfers<Id: Clone>(
    people: impl IntoIterator<Item = PersonBalance<Id>>,
    options: TransferOptions,
) -> TransferPlan<Id> {
    let people: Vec<PersonBalance<Id>> = people.into_iter().collect();

    let greedy = greedy_transfers(&people, options);
    let optimized = exact_match_transfers(&people, options);
    let greedy_count = greedy.len();
    let optimized_count = optimized.len();

    let (payments, strategy) = if optimized_count <= greedy_count {
        (optimized, TransferStrategy::ExactMatch)
    } else {
        (greedy, TransferStrategy::Greedy)
    };

    let plan = TransferPlan {
        payments,
        strategy,
        greedy_count,
        optimized_count,
    };

    debug_assert!({
        let partition = Partition::from_people(&people, options.noise_threshold());
        plan.total_amount() == partition.debt_mass().min(partition.credit_mass())
    });

    tracing::debug!(
        person_count = people.len(),
        greedy_count,
        optimized_count,
        strategy = ?plan.strategy,
        transfers_saved = plan.transfers_saved(),
        "Constructed settlement transfers"
    );

    plan
}
