use std::time::Duration;

use orderpulse_core::order_generation::{AmountRange, DEFAULT_MAX_AMOUNT, DEFAULT_MIN_AMOUNT};

/// Default time between two cycles of a job.
pub const DEFAULT_PERIOD_SECS: u64 = 60;

/// How long `shutdown` waits for each worker to exit.
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;

/// Settings shared by every job the registry spawns.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Interval between cycles. The first cycle runs immediately.
    pub period: Duration,
    /// Range generated order amounts are drawn from.
    pub amounts: AmountRange,
    /// Per-worker wait during registry shutdown.
    pub shutdown_grace: Duration,
}

impl JobConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `ORDER_JOB_INTERVAL_SECS` | `60`    |
    /// | `ORDER_AMOUNT_MIN`        | `100`   |
    /// | `ORDER_AMOUNT_MAX`        | `5000`  |
    ///
    /// `ORDER_AMOUNT_MAX` is exclusive.
    pub fn from_env() -> Self {
        let period_secs: u64 = std::env::var("ORDER_JOB_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_PERIOD_SECS.to_string())
            .parse()
            .ok()
            .filter(|secs| *secs > 0)
            .expect("ORDER_JOB_INTERVAL_SECS must be a positive integer");

        let min: i64 = std::env::var("ORDER_AMOUNT_MIN")
            .unwrap_or_else(|_| DEFAULT_MIN_AMOUNT.to_string())
            .parse()
            .expect("ORDER_AMOUNT_MIN must be a valid i64");

        let max: i64 = std::env::var("ORDER_AMOUNT_MAX")
            .unwrap_or_else(|_| DEFAULT_MAX_AMOUNT.to_string())
            .parse()
            .expect("ORDER_AMOUNT_MAX must be a valid i64");

        let amounts = AmountRange::new(min, max)
            .unwrap_or_else(|e| panic!("Invalid order amount range: {e}"));

        Self {
            period: Duration::from_secs(period_secs),
            amounts,
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
        }
    }

    /// Replace the cycle period.
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn with_period(mut self, period: Duration) -> Self {
        assert!(!period.is_zero(), "job period must be non-zero");
        self.period = period;
        self
    }

    pub fn with_amounts(mut self, amounts: AmountRange) -> Self {
        self.amounts = amounts;
        self
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(DEFAULT_PERIOD_SECS),
            amounts: AmountRange::default(),
            shutdown_grace: Duration::from_secs(DEFAULT_SHUTDOWN_GRACE_SECS),
        }
    }
}
