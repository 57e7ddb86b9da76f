use splitledger_transfer_construction::{
    PersonBalance, TransferOptions, construct_settlement_transfers, greedy_transfers,
};

use crate::{
    model::{MemberId, Money, Settlement, Transfer},
    services::Balances,
};

/// Turns the balances of a single scope into transfers.
///
/// Netting across all members is only valid when every balance comes from
/// the same scope; cross-scope views go through
/// [`PairwiseLedger`](crate::services::PairwiseLedger) instead.
pub struct TransferConstructor;

impl TransferConstructor {
    /// Runs the greedy merge and the exact-match optimizer and keeps the plan
    /// with fewer transfers. This is a heuristic, not a minimum.
    pub fn calculate(&self, balances: &Balances, noise_threshold: Money) -> Settlement {
        let plan = construct_settlement_transfers(
            person_balances(balances),
            transfer_options(noise_threshold),
        );

        let transfers: Vec<Transfer> = plan
            .payments
            .into_iter()
            .map(|payment| Transfer {
                from: payment.from,
                to: payment.to,
                amount: Money::from_i64(payment.amount),
            })
            .collect();

        debug_assert!(transfers.iter().all(|transfer| transfer.from != transfer.to));

        Settlement {
            transfers,
            greedy_transfer_count: plan.greedy_count,
            optimized_transfer_count: plan.optimized_count,
        }
    }

    /// Greedy merge only, without the exact-match pass.
    pub fn calculate_greedy(&self, balances: &Balances, noise_threshold: Money) -> Vec<Transfer> {
        let people: Vec<PersonBalance<MemberId>> = person_balances(balances).collect();
        greedy_transfers(&people, transfer_options(noise_threshold))
            .into_iter()
            .map(|payment| Transfer {
                from: payment.from,
                to: payment.to,
                amount: Money::from_i64(payment.amount),
            })
            .collect()
    }
}

fn person_balances(balances: &Balances) -> impl Iterator<Item = PersonBalance<MemberId>> + '_ {
    balances.iter().map(|balance| PersonBalance {
        id: balance.member.clone(),
        balance: balance.balance.amount(),
    })
}

fn transfer_options(noise_threshold: Money) -> TransferOptions {
    TransferOptions::default().with_noise_threshold(noise_threshold.amount())
}
