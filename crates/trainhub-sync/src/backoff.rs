//! Exponential backoff bookkeeping per sync key.

use std::time::Duration;

use trainhub_core::config::SyncConfig;

/// Consecutive-failure counter with exponential delay derivation.
#[derive(Debug, Default)]
pub struct BackoffState {
    consecutive_failures: u32,
}

impl BackoffState {
    /// Record a failure and return the wait before the next attempt.
    ///
    /// The delay doubles (or grows by the configured multiplier) per
    /// consecutive failure, capped at `max_backoff_ms`.
    pub fn record_failure(&mut self, config: &SyncConfig) -> Duration {
        // Cap the exponent so the pow cannot overflow before the min().
        let exponent = self.consecutive_failures.min(16);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);

        let factor = u64::from(config.backoff_multiplier).saturating_pow(exponent);
        let ms = config
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(config.max_backoff_ms);
        Duration::from_millis(ms)
    }

    /// Number of consecutive failures recorded.
    pub fn failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        let config = SyncConfig {
            initial_backoff_ms: 100,
            max_backoff_ms: 1_000,
            backoff_multiplier: 2,
        };
        let mut state = BackoffState::default();

        assert_eq!(state.record_failure(&config), Duration::from_millis(100));
        assert_eq!(state.record_failure(&config), Duration::from_millis(200));
        assert_eq!(state.record_failure(&config), Duration::from_millis(400));
        assert_eq!(state.record_failure(&config), Duration::from_millis(800));
        // Capped from here on.
        assert_eq!(state.record_failure(&config), Duration::from_millis(1_000));
        assert_eq!(state.record_failure(&config), Duration::from_millis(1_000));
        assert_eq!(state.failures(), 6);
    }
}
