//! Reconnect backoff policy.

use std::time::Duration;

use chainview_core::config::RealtimeConfig;

/// Bounded exponential backoff: attempt `n` waits `base^n` seconds, and no
/// attempt past `max_attempts` is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Automatic attempts before giving up.
    pub max_attempts: u32,
    /// Exponent base, in seconds.
    pub base_seconds: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_seconds: 2,
        }
    }
}

impl ReconnectPolicy {
    /// Build the policy from the `[realtime]` section.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self {
            max_attempts: config.max_reconnect_attempts,
            base_seconds: config.backoff_base_seconds,
        }
    }

    /// Delay before attempt `attempt` (1-based), or `None` once the ceiling
    /// is passed.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        Some(Duration::from_secs(self.base_seconds.saturating_pow(attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_double_up_to_ceiling() {
        let policy = ReconnectPolicy::default();
        let delays: Vec<u64> = (1..=5)
            .map(|n| policy.delay_for(n).unwrap().as_secs())
            .collect();
        assert_eq!(delays, vec![2, 4, 8, 16, 32]);
        assert_eq!(policy.delay_for(6), None);
        assert_eq!(policy.delay_for(0), None);
    }

    #[test]
    fn test_from_config() {
        let config = RealtimeConfig {
            max_reconnect_attempts: 2,
            backoff_base_seconds: 3,
            ..RealtimeConfig::default()
        };
        let policy = ReconnectPolicy::from_config(&config);
        assert_eq!(policy.delay_for(2), Some(Duration::from_secs(9)));
        assert_eq!(policy.delay_for(3), None);
    }
}
