//! Bounded retry policy for session creation

use std::time::Duration;

use crate::config::SessionConfig;

/// Fixed-delay retry policy with an attempt budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before every automatic retry
    pub delay: Duration,
    /// Automatic retries allowed before a manual retry is required
    pub max_retries: u32,
}

/// Next automatic retry to schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDecision {
    /// 1-based retry number
    pub attempt: u32,
    /// Delay before the retry runs
    pub delay: Duration,
}

impl RetryPolicy {
    /// Decide the next retry given how many automatic retries already ran
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use pokegpt::session::RetryPolicy;
    ///
    /// let policy = RetryPolicy { delay: Duration::from_secs(2), max_retries: 3 };
    /// assert_eq!(policy.next(0).unwrap().attempt, 1);
    /// assert!(policy.next(3).is_none());
    /// ```
    pub fn next(&self, retries_made: u32) -> Option<RetryDecision> {
        (retries_made < self.max_retries).then(|| RetryDecision {
            attempt: retries_made + 1,
            delay: self.delay,
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for RetryPolicy {
    fn from(config: &SessionConfig) -> Self {
        Self {
            delay: config.retry_delay(),
            max_retries: config.max_retries,
        }
    }
}
