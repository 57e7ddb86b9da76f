use indexmap::IndexMap;
use serde::Serialize;

use splitledger_domain::{Balance, MemberId, Participant, ScopeId, ScopeLedger, Transfer};

/// Optimizer bookkeeping, useful for regression tests rather than end users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettlementDiagnostics {
    pub greedy_transfer_count: usize,
    pub optimized_transfer_count: usize,
    pub transfers_saved: usize,
}

/// Balances and netted transfers for one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeSettlement {
    pub scope: ScopeId,
    pub balances: Vec<Balance>,
    pub transfers: Vec<Transfer>,
    pub diagnostics: SettlementDiagnostics,
}

/// Pairwise view over several scopes.
///
/// `balances` are per-participant totals across the scopes and are shown for
/// information only; `transfers` come from the pairwise ledger and never
/// connect two people who did not transact directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossScopeSettlement {
    pub scopes: Vec<ScopeId>,
    pub balances: Vec<Balance>,
    pub transfers: Vec<Transfer>,
}

/// Everything read from one ledger source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    pub participants: IndexMap<MemberId, Participant>,
    pub scopes: Vec<ScopeLedger>,
}

impl Ledger {
    pub fn scope(&self, scope: &ScopeId) -> Option<&ScopeLedger> {
        self.scopes.iter().find(|ledger| ledger.scope == *scope)
    }

    pub fn member_ids(&self) -> Vec<MemberId> {
        self.participants.keys().cloned().collect()
    }
}
