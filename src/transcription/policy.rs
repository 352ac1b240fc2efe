//! Polling policy for transcription jobs.
//!
//! The default policy polls every 5 seconds forever. Callers that want a
//! safety limit opt in with [`PollPolicy::with_max_attempts`] or
//! [`PollPolicy::with_timeout`]; a growing interval is available through
//! [`PollPolicy::with_backoff`].

use std::time::Duration;

/// Default wait between two status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How often and how long to poll a job.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Wait after the first non-terminal status.
    pub interval: Duration,
    /// Maximum number of status queries. `None` polls without limit.
    pub max_attempts: Option<u32>,
    /// Maximum total time spent polling. `None` polls without limit.
    pub timeout: Option<Duration>,
    /// Multiplier applied to the interval after every wait. `1.0` keeps it fixed.
    pub backoff_factor: f64,
    /// Upper bound for the grown interval.
    pub max_interval: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::unbounded(DEFAULT_POLL_INTERVAL)
    }
}

impl PollPolicy {
    /// Fixed interval, no attempt limit, no timeout.
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            timeout: None,
            backoff_factor: 1.0,
            max_interval: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_backoff(mut self, factor: f64, max_interval: Option<Duration>) -> Self {
        self.backoff_factor = factor;
        self.max_interval = max_interval;
        self
    }

    /// True when neither an attempt limit nor a timeout is set.
    pub fn is_unbounded(&self) -> bool {
        self.max_attempts.is_none() && self.timeout.is_none()
    }

    /// Interval to use after waiting `current`.
    ///
    /// Never shorter than `current`. A product too large for a `Duration`
    /// becomes the cap, or `Duration::MAX` without one.
    pub fn next_interval(&self, current: Duration) -> Duration {
        if self.backoff_factor <= 1.0 {
            return current;
        }
        let grown = Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_factor)
            .unwrap_or(Duration::MAX);
        match self.max_interval {
            Some(cap) => grown.min(cap.max(current)),
            None => grown,
        }
    }

    /// Whether another wait-and-query is allowed after `attempts` queries,
    /// `elapsed` time spent so far and an upcoming wait of `wait`.
    pub fn allows_another_attempt(&self, attempts: u32, elapsed: Duration, wait: Duration) -> bool {
        if let Some(max) = self.max_attempts {
            if attempts >= max {
                return false;
            }
        }
        if let Some(timeout) = self.timeout {
            if elapsed.saturating_add(wait) > timeout {
                return false;
            }
        }
        true
    }
}
