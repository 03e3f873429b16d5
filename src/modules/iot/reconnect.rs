use std::time::Duration;

pub const BASE_DELAY_MS: u64 = 1000;
pub const MAX_DELAY_MS: u64 = 30_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Interval at which clients are expected to ping.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Exponential backoff between reconnect attempts.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts,
            attempts: 0,
        }
    }

    /// Delay before 1-based attempt `attempt`.
    pub fn delay(attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.min(32));
        Duration::from_millis(BASE_DELAY_MS.saturating_mul(factor).min(MAX_DELAY_MS))
    }

    /// Records a failure and returns the wait before the next attempt,
    /// or `None` once the attempts are used up.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(Self::delay(self.attempts))
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_doubles_then_caps() {
        assert_eq!(ReconnectPolicy::delay(1), Duration::from_millis(2000));
        assert_eq!(ReconnectPolicy::delay(2), Duration::from_millis(4000));
        assert_eq!(ReconnectPolicy::delay(4), Duration::from_millis(16000));
        assert_eq!(ReconnectPolicy::delay(5), Duration::from_millis(30000));
        assert_eq!(ReconnectPolicy::delay(40), Duration::from_millis(30000));
    }

    #[test]
    fn attempts_are_capped_and_reset() {
        let mut policy = ReconnectPolicy::default();
        let delays: Vec<Duration> = std::iter::from_fn(|| policy.next_delay()).collect();
        assert_eq!(delays.len(), 5);
        assert_eq!(policy.attempts(), 5);
        assert_eq!(policy.next_delay(), None);

        policy.reset();
        assert_eq!(policy.attempts(), 0);
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(2000)));
    }

    #[test]
    fn zero_attempts_never_retries() {
        let mut policy = ReconnectPolicy::new(0);
        assert_eq!(policy.next_delay(), None);
    }
}
