use std::{env, time::Duration};

use splitledger_domain::{Money, NOISE_THRESHOLD};

use crate::error::ConfigError;

pub const NOISE_THRESHOLD_ENV: &str = "SPLITLEDGER_NOISE_THRESHOLD";
pub const DUPLICATE_WINDOW_ENV: &str = "SPLITLEDGER_DUPLICATE_WINDOW_SECS";

/// How long an identical settlement is rejected after it was first recorded.
pub const DEFAULT_DUPLICATE_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Balances and pair debts with a smaller magnitude count as settled.
    pub noise_threshold: Money,
    /// Window used by [`SettlementDeduplicator`](crate::SettlementDeduplicator).
    pub duplicate_window: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            noise_threshold: NOISE_THRESHOLD,
            duplicate_window: DEFAULT_DUPLICATE_WINDOW,
        }
    }
}

impl EngineConfig {
    pub fn with_noise_threshold(mut self, noise_threshold: Money) -> Self {
        self.noise_threshold = noise_threshold;
        self
    }

    pub fn with_duplicate_window(mut self, duplicate_window: Duration) -> Self {
        self.duplicate_window = duplicate_window;
        self
    }

    /// Reads overrides from the process environment. Unset variables keep
    /// their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(NOISE_THRESHOLD_ENV) {
            config.noise_threshold = parse_noise_threshold(NOISE_THRESHOLD_ENV, &raw)?;
        }

        if let Some(raw) = lookup(DUPLICATE_WINDOW_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidDuplicateWindow {
                    key: DUPLICATE_WINDOW_ENV,
                    value: raw.clone(),
                })?;
            config.duplicate_window = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

pub fn parse_noise_threshold(key: &'static str, raw: &str) -> Result<Money, ConfigError> {
    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 1 => Ok(Money::from_i64(value)),
        _ => Err(ConfigError::InvalidNoiseThreshold {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key: &str| vars.get(key).map(|value| (*value).to_string())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).expect("default config");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.noise_threshold, Money::from_i64(1));
        assert_eq!(config.duplicate_window, Duration::from_secs(60));
    }

    #[test]
    fn overrides_are_read() {
        let config = EngineConfig::from_lookup(lookup(&[
            (NOISE_THRESHOLD_ENV, " 5 "),
            (DUPLICATE_WINDOW_ENV, "120"),
        ]))
        .expect("config with overrides");
        assert_eq!(config.noise_threshold, Money::from_i64(5));
        assert_eq!(config.duplicate_window, Duration::from_secs(120));
    }

    #[rstest]
    #[case::zero("0")]
    #[case::negative("-3")]
    #[case::fractional("0.5")]
    #[case::garbage("abc")]
    fn rejects_invalid_noise_threshold(#[case] raw: &'static str) {
        let result = EngineConfig::from_lookup(lookup(&[(NOISE_THRESHOLD_ENV, raw)]));
        assert_eq!(
            result,
            Err(ConfigError::InvalidNoiseThreshold {
                key: NOISE_THRESHOLD_ENV,
                value: raw.to_string(),
            })
        );
    }

    #[test]
    fn rejects_invalid_duplicate_window() {
        let result = EngineConfig::from_lookup(lookup(&[(DUPLICATE_WINDOW_ENV, "soon")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuplicateWindow { .. })
        ));
    }
}
