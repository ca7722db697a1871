//! Fixed-interval readiness polling.
//!
//! After a dependent service is started it usually needs a while before it
//! accepts connections. [`ReadinessWaiter`] sleeps for a fixed interval, runs
//! a probe, and repeats until the probe succeeds or the retry budget is spent.
//!
//! ```text
//!   ┌──────────┐   ┌───────┐  ok   ┌────────────────┐
//!   │ sleep(i) │──▶│ probe │──────▶│ Ok(Readiness)  │
//!   └──────────┘   └───────┘       └────────────────┘
//!        ▲             │ err
//!        │  budget left│
//!        └─────────────┤
//!                      │ budget spent
//!                      ▼
//!            ┌────────────────────────────┐
//!            │ Err(Exhausted { last, .. })│
//!            └────────────────────────────┘
//! ```
//!
//! The interval is slept before every probe, including the first one: a
//! container that was started a moment ago is never probed immediately.
//! A [`CancellationToken`] ends the wait early from either phase.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{ProbeError, ReadinessError};
use crate::probe::Probe;

/// How long to wait between probes and how many probes to allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Probe budget. A value of 0 still allows one probe.
    pub max_attempts: u32,
    /// Sleep before each probe.
    pub interval: Duration,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(5),
        }
    }
}

/// Progress of one wait. Lives only for the duration of a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    max_attempts: u32,
    interval: Duration,
}

impl RetryState {
    pub fn new(policy: &ReadinessPolicy) -> Self {
        Self {
            attempt: 0,
            max_attempts: policy.max_attempts.max(1),
            interval: policy.interval,
        }
    }

    /// Failed probes so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Effective budget (never below 1).
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a failed probe. Returns `true` while budget remains for another one.
    pub fn record_failure(&mut self) -> bool {
        if self.attempt < self.max_attempts {
            self.attempt += 1;
        }
        self.attempt < self.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt == self.max_attempts
    }
}

/// A successful wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    /// Probes run, including the successful one.
    pub attempts: u32,
    /// Time from the start of the wait until the probe succeeded.
    pub elapsed: Duration,
}

/// Blocks until a dependent service answers its probe.
#[derive(Debug, Clone)]
pub struct ReadinessWaiter {
    policy: ReadinessPolicy,
    cancel: CancellationToken,
}

impl ReadinessWaiter {
    pub fn new(policy: ReadinessPolicy) -> Self {
        Self {
            policy,
            cancel: CancellationToken::new(),
        }
    }

    /// End the wait with [`ReadinessError::Cancelled`] once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Wait until `probe` succeeds.
    pub async fn wait(&self, probe: &dyn Probe) -> Result<Readiness, ReadinessError> {
        let target = probe.target();
        self.wait_with(&target, || probe.check()).await
    }

    /// Wait until the closure-based probe succeeds.
    ///
    /// `target` only labels log lines.
    pub async fn wait_with<F, Fut>(
        &self,
        target: &str,
        mut probe: F,
    ) -> Result<Readiness, ReadinessError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), ProbeError>>,
    {
        let started = Instant::now();
        let mut state = RetryState::new(&self.policy);

        tracing::info!(
            "Waiting for {} (up to {} attempts, every {:?})",
            target,
            state.max_attempts(),
            state.interval()
        );

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(ReadinessError::Cancelled { attempts: state.attempt() });
                }
                _ = tokio::time::sleep(state.interval()) => {}
            }

            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(ReadinessError::Cancelled { attempts: state.attempt() });
                }
                outcome = probe() => outcome,
            };

            match outcome {
                Ok(()) => {
                    let readiness = Readiness {
                        attempts: state.attempt() + 1,
                        elapsed: started.elapsed(),
                    };
                    tracing::debug!(
                        "{} ready after {} attempts ({:?})",
                        target,
                        readiness.attempts,
                        readiness.elapsed
                    );
                    return Ok(readiness);
                }
                Err(e) => {
                    if state.record_failure() {
                        tracing::debug!(
                            "{} not ready (attempt {}/{}): {}",
                            target,
                            state.attempt(),
                            state.max_attempts(),
                            e
                        );
                        continue;
                    }

                    tracing::warn!("Over max retry count for {}: {}", target, e);
                    return Err(ReadinessError::Exhausted {
                        attempts: state.attempt(),
                        last: e,
                    });
                }
            }
        }
    }
}
