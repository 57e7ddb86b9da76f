use splitledger_domain::{
    BalanceCalculator, Balances, MemberId, PairwiseLedger, ScopeLedger, Transfer,
    TransferConstructor,
};

use crate::{
    config::EngineConfig,
    model::{CrossScopeSettlement, ScopeSettlement, SettlementDiagnostics},
};

/// Entry points for settling one scope or viewing debts across scopes.
///
/// Single-scope and cross-scope modes are separate methods: balances from
/// different scopes must never be netted together.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementEngine {
    config: EngineConfig,
}

impl SettlementEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn settle_scope(&self, ledger: &ScopeLedger) -> ScopeSettlement {
        self.settle_scope_with_members(ledger, &[])
    }

    /// Same as [`settle_scope`](Self::settle_scope), with `members` listed
    /// first in the balances even when they have no activity.
    ///
    /// Members whose balance magnitude is below the noise threshold take no
    /// part in the transfers. With a threshold above 1 their combined
    /// amount can leave a residual on the other side: balances of +4, +4
    /// and -8 under a threshold of 5 produce no transfers at all, and the
    /// -8 stays in the reported balances.
    pub fn settle_scope_with_members(
        &self,
        ledger: &ScopeLedger,
        members: &[MemberId],
    ) -> ScopeSettlement {
        let balances =
            BalanceCalculator.calculate_with_members(members, &ledger.expenses, &ledger.settlements);
        let settlement = TransferConstructor.calculate(&balances, self.config.noise_threshold);

        tracing::debug!(
            scope = %ledger.scope,
            member_count = balances.len(),
            expense_count = ledger.expenses.len(),
            settlement_count = ledger.settlements.len(),
            transfer_count = settlement.transfers.len(),
            transfers_saved = settlement.transfers_saved(),
            "Settled scope"
        );

        let diagnostics = SettlementDiagnostics {
            greedy_transfer_count: settlement.greedy_transfer_count,
            optimized_transfer_count: settlement.optimized_transfer_count,
            transfers_saved: settlement.transfers_saved(),
        };

        ScopeSettlement {
            scope: ledger.scope.clone(),
            balances: balances.into_vec(),
            transfers: settlement.transfers,
            diagnostics,
        }
    }

    pub fn settle_across_scopes(&self, scopes: &[ScopeLedger]) -> CrossScopeSettlement {
        let balances: Balances = BalanceCalculator.calculate_scopes(scopes);
        let ledger = PairwiseLedger::from_scopes(scopes);
        let transfers = ledger.transfers(self.config.noise_threshold);

        tracing::debug!(
            scope_count = scopes.len(),
            member_count = balances.len(),
            pair_count = ledger.pair_count(),
            transfer_count = transfers.len(),
            "Aggregated pairwise debts across scopes"
        );

        CrossScopeSettlement {
            scopes: scopes.iter().map(|scope| scope.scope.clone()).collect(),
            balances: balances.into_vec(),
            transfers,
        }
    }

    /// Pairwise transfers `member` pays or receives across `scopes`.
    pub fn outstanding_for_member(
        &self,
        scopes: &[ScopeLedger],
        member: &MemberId,
    ) -> Vec<Transfer> {
        let transfers = PairwiseLedger::from_scopes(scopes)
            .transfers_involving(member, self.config.noise_threshold);
        tracing::debug!(
            member = %member,
            scope_count = scopes.len(),
            transfer_count = transfers.len(),
            "Collected outstanding transfers for member"
        );
        transfers
    }
}
