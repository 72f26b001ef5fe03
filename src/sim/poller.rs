//! List poll chain
//!
//! Exactly one list request is in flight at a time. The next one is issued as
//! soon as the previous response has been processed, with no fixed interval.
//! Failures either end the chain or schedule a jittered, exponentially
//! growing retry, depending on the `RetryPolicy`.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::settings::RetryPolicy;

/// Where the chain currently is
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollStatus {
    /// Not started yet
    Idle,
    /// Waiting on the list request with this sequence number
    InFlight { seq: u64 },
    /// Backing off after a failure; seconds left before the retry
    Backoff { remaining: f32 },
    /// Chain ended after a failure (RetryPolicy::Stop)
    Stopped,
}

/// Poll chain state
#[derive(Debug, Clone)]
pub struct Poller {
    status: PollStatus,
    policy: RetryPolicy,
    /// Consecutive failures since the last success
    failures: u32,
    rng: Pcg32,
}

impl Poller {
    pub fn new(policy: RetryPolicy, seed: u64) -> Self {
        Self {
            status: PollStatus::Idle,
            policy,
            failures: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn status(&self) -> PollStatus {
        self.status
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn is_stopped(&self) -> bool {
        self.status == PollStatus::Stopped
    }

    /// Whether the chain wants a new list request now
    pub fn wants_request(&self) -> bool {
        matches!(self.status, PollStatus::Idle)
    }

    /// Record that list request `seq` was sent
    pub fn issued(&mut self, seq: u64) {
        self.status = PollStatus::InFlight { seq };
    }

    /// Whether `seq` is the list request the chain is waiting on
    pub fn owns(&self, seq: u64) -> bool {
        self.status == PollStatus::InFlight { seq }
    }

    /// The in-flight request succeeded; chain continues immediately
    pub fn succeeded(&mut self) {
        self.failures = 0;
        self.status = PollStatus::Idle;
    }

    /// The in-flight request failed; apply the retry policy
    pub fn failed(&mut self) {
        self.failures += 1;
        self.status = match self.policy {
            RetryPolicy::Stop => PollStatus::Stopped,
            RetryPolicy::Backoff { .. } => PollStatus::Backoff {
                remaining: self.backoff_delay(),
            },
        };
    }

    /// Count down a pending backoff; returns to Idle when it expires
    pub fn tick(&mut self, dt: f32) {
        if let PollStatus::Backoff { remaining } = self.status {
            let remaining = remaining - dt;
            self.status = if remaining <= 0.0 {
                PollStatus::Idle
            } else {
                PollStatus::Backoff { remaining }
            };
        }
    }

    /// Delay in seconds before retry number `self.failures`
    fn backoff_delay(&mut self) -> f32 {
        let RetryPolicy::Backoff {
            initial_ms,
            max_ms,
            multiplier,
            jitter,
        } = self.policy
        else {
            return 0.0;
        };

        let exponent = self.failures.saturating_sub(1).min(31) as i32;
        let base = (initial_ms as f32 * multiplier.powi(exponent)).min(max_ms as f32);
        let spread = if jitter > 0.0 {
            self.rng.random_range(-jitter..=jitter)
        } else {
            0.0
        };
        (base * (1.0 + spread)).max(0.0) / 1000.0
    }
}
