use std::time::Duration;

use reqwest::StatusCode;

/// Retry behaviour of the request executor.
///
/// Rate limiting (429) and network recovery keep separate counters: attempts
/// spent waiting out a 429 never reduce the budget for transient failures and
/// the other way round.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// How many 429 responses are waited out before `RateLimited` surfaces.
    pub max_rate_limit_retries: u32,
    /// Wait used when a 429 carries no usable `Retry-After`.
    pub default_retry_after: Duration,
    /// Longest `Retry-After` the executor agrees to sleep through.
    pub max_retry_after: Duration,
    pub network_recovery: NetworkRecovery,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_rate_limit_retries: 3,
            default_retry_after: Duration::from_secs(1),
            max_retry_after: Duration::from_secs(120),
            network_recovery: NetworkRecovery::Enabled(BackoffPolicy::default()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum NetworkRecovery {
    Disabled,
    Enabled(BackoffPolicy),
}

impl NetworkRecovery {
    pub fn max_retries(&self) -> u32 {
        match self {
            NetworkRecovery::Disabled => 0,
            NetworkRecovery::Enabled(policy) => policy.max_retries,
        }
    }

    pub fn retries_status(&self, status: StatusCode) -> bool {
        match self {
            NetworkRecovery::Disabled => false,
            NetworkRecovery::Enabled(policy) => policy.retryable_statuses.contains(&status),
        }
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            NetworkRecovery::Disabled => Duration::ZERO,
            NetworkRecovery::Enabled(policy) => policy.delay(attempt),
        }
    }
}

/// Exponential backoff for transient failures.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub retryable_statuses: Vec<StatusCode>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            retryable_statuses: vec![
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }
}

impl BackoffPolicy {
    /// `min(base_delay * 2^(attempt-1), max_delay)`, `attempt` starting at 1.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = BackoffPolicy {
            max_retries: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            ..BackoffPolicy::default()
        };

        assert_eq!(policy.delay(1), Duration::from_millis(100));
        assert_eq!(policy.delay(2), Duration::from_millis(200));
        assert_eq!(policy.delay(4), Duration::from_millis(800));
        assert_eq!(policy.delay(5), Duration::from_millis(1000));
        assert_eq!(policy.delay(40), Duration::from_millis(1000));
    }

    #[test]
    fn test_disabled_recovery_retries_nothing() {
        let recovery = NetworkRecovery::Disabled;
        assert_eq!(recovery.max_retries(), 0);
        assert!(!recovery.retries_status(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[test]
    fn test_default_statuses() {
        let recovery = NetworkRecovery::Enabled(BackoffPolicy::default());
        assert!(recovery.retries_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(recovery.retries_status(StatusCode::BAD_GATEWAY));
        assert!(!recovery.retries_status(StatusCode::NOT_FOUND));
    }
}
