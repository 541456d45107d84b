//! Fixed-interval polling with an optional budget.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::RollError;
use crate::orchestrator::Phase;

/// Default interval between poll attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How a wait phase polls.
///
/// With neither `timeout` nor `max_attempts` set the loop waits until the
/// condition holds, however long that takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between attempts.
    pub interval: Duration,

    /// Give up once this much time has passed since the first attempt.
    pub timeout: Option<Duration>,

    /// Give up after this many attempts.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::unbounded(DEFAULT_POLL_INTERVAL)
    }
}

impl PollPolicy {
    /// Poll forever at the given interval.
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            timeout: None,
            max_attempts: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn is_bounded(&self) -> bool {
        self.timeout.is_some() || self.max_attempts.is_some()
    }
}

/// Evaluate `check` until it returns true.
///
/// Returns the number of attempts it took. Fails with
/// [`RollError::PollTimeout`] once the policy's budget runs out.
pub async fn poll_until<F, Fut>(
    policy: &PollPolicy,
    phase: Phase,
    mut check: F,
) -> Result<u32, RollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let started = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        if check().await {
            info!(%phase, attempts, "condition met");
            return Ok(attempts);
        }

        let elapsed = started.elapsed();
        let out_of_attempts = policy.max_attempts.is_some_and(|max| attempts >= max);
        let out_of_time = policy
            .timeout
            .is_some_and(|timeout| elapsed.saturating_add(policy.interval) > timeout);

        if out_of_attempts || out_of_time {
            return Err(RollError::PollTimeout {
                phase,
                attempts,
                elapsed,
            });
        }

        debug!(%phase, attempts, interval = ?policy.interval, "condition not met, sleeping");
        tokio::time::sleep(policy.interval).await;
    }
}
