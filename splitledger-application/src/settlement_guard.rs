use indexmap::IndexMap;
use std::time::{Duration, Instant};

use splitledger_domain::{MemberId, Money, ScopeId, SettlementRecord};

use crate::{
    config::{DEFAULT_DUPLICATE_WINDOW, EngineConfig},
    error::DuplicateSettlement,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SettlementKey {
    pub scope: ScopeId,
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

impl SettlementKey {
    pub fn new(scope: &ScopeId, record: &SettlementRecord) -> Self {
        Self {
            scope: scope.clone(),
            from: record.from.clone(),
            to: record.to.clone(),
            amount: record.amount,
        }
    }
}

/// Rejects a settlement creation that repeats an identical
/// (scope, payer, receiver, amount) tuple inside a short window.
///
/// This belongs to whoever records settlements (the API layer). The engine
/// itself never consults it and stays stateless.
///
/// # Invariant
/// `now` must be non-decreasing across calls; entries are evicted in
/// insertion order.
#[derive(Debug, Clone)]
pub struct SettlementDeduplicator {
    window: Duration,
    recent: IndexMap<SettlementKey, Instant>,
}

impl Default for SettlementDeduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_DUPLICATE_WINDOW)
    }
}

impl SettlementDeduplicator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            recent: IndexMap::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.duplicate_window)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records `key` at `now`, or fails if the same key was recorded less
    /// than one window ago.
    pub fn check_and_record(
        &mut self,
        key: SettlementKey,
        now: Instant,
    ) -> Result<(), DuplicateSettlement> {
        self.evict_expired(now);

        if let Some(&recorded_at) = self.recent.get(&key) {
            let elapsed = now.saturating_duration_since(recorded_at);
            tracing::warn!(
                scope = %key.scope,
                from = %key.from,
                to = %key.to,
                amount = %key.amount,
                elapsed_ms = elapsed.as_millis() as u64,
                "Rejected duplicate settlement"
            );
            let SettlementKey {
                scope,
                from,
                to,
                amount,
            } = key;
            return Err(DuplicateSettlement {
                scope,
                from,
                to,
                amount,
                elapsed,
            });
        }

        self.recent.insert(key, now);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    fn evict_expired(&mut self, now: Instant) {
        while let Some((_, &recorded_at)) = self.recent.first() {
            if now.saturating_duration_since(recorded_at) < self.window {
                break;
            }
            self.recent.shift_remove_index(0);
        }
    }
}
