//! Bounded retry of conflicted transactions
//!
//! Retrying is opt-in: the default policy makes exactly one attempt and
//! hands `Conflict` back to the caller. Only `Conflict` is ever retried.
//! Suppression is a success and errors are not transient in a way a
//! resubmission of the same transaction can fix.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::IndexResult;
use super::outcome::Outcome;
use super::plan::TransactionPlan;
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::store::IndexStore;

fn default_max_attempts() -> u32 {
    1
}

fn default_base_delay_ms() -> u64 {
    50
}

fn default_max_delay_ms() -> u64 {
    1_000
}

/// How many times a conflicted transaction is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first (>= 1)
    pub max_attempts: u32,
    /// First backoff delay
    pub base_delay_ms: u64,
    /// Upper bound on a single backoff delay, before jitter
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// Single attempt; conflicts surface immediately
    pub fn none() -> Self {
        Self::default()
    }

    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn with_delays(mut self, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("retry.max_attempts must be >= 1".into());
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err(format!(
                "retry.base_delay_ms ({}) exceeds retry.max_delay_ms ({})",
                self.base_delay_ms, self.max_delay_ms
            ));
        }
        Ok(())
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.base_delay_ms, self.max_delay_ms)
    }
}

/// Exponential backoff with jitter
#[derive(Debug)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
    attempt: u32,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base_ms,
            max_ms,
            attempt: 0,
        }
    }

    /// Next delay; advances the attempt counter
    pub fn next_delay(&mut self) -> Duration {
        let factor = 1u64.checked_shl(self.attempt).unwrap_or(u64::MAX);
        let capped = self.base_ms.saturating_mul(factor).min(self.max_ms);
        let jitter = rand::random::<u64>() % (capped / 4 + 1);
        self.attempt = self.attempt.saturating_add(1);
        Duration::from_millis(capped.saturating_add(jitter))
    }
}

/// Submit the plan's transaction, resubmitting on `Conflict` while the
/// policy allows, and classify the final response.
pub(crate) async fn execute(
    store: &dyn IndexStore,
    plan: &TransactionPlan,
    policy: &RetryPolicy,
    metrics: &MetricsRegistry,
) -> IndexResult<Outcome> {
    let mut backoff = policy.backoff();
    let mut attempt = 1;

    loop {
        let outcome = plan.classify(store.transact_write(plan.request()).await)?;

        let reasons = match outcome {
            Outcome::Conflict(reasons) if attempt < policy.max_attempts => reasons,
            other => return Ok(other),
        };

        let delay = backoff.next_delay();
        let attempt_str = attempt.to_string();
        let delay_str = delay.as_millis().to_string();
        metrics.increment_retries();
        Logger::warn(
            Event::TransactionRetry.as_str(),
            &[
                ("attempt", attempt_str.as_str()),
                ("delay_ms", delay_str.as_str()),
                ("object_key", plan.object_key().as_str()),
                ("reasons", reasons.as_str()),
            ],
        );

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
