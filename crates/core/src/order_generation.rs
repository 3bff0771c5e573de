//! Synthesis of auto-generated orders.
//!
//! This module lives in `core` (no I/O) so the job worker and its tests can
//! share the exact amount bounds and description text.

use rand::Rng;
use rust_decimal::Decimal;

use crate::error::CoreError;

/// Description stamped on every order produced by a customer job.
pub const AUTO_ORDER_DESCRIPTION: &str = "Auto-generated order";

/// Default inclusive lower bound for generated amounts.
pub const DEFAULT_MIN_AMOUNT: i64 = 100;

/// Default exclusive upper bound for generated amounts.
pub const DEFAULT_MAX_AMOUNT: i64 = 5000;

/// Half-open range `[min, max)` of whole-unit amounts a job may generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    min: i64,
    max: i64,
}

impl AmountRange {
    /// Create a range, rejecting empty or negative ranges.
    pub fn new(min: i64, max: i64) -> Result<Self, CoreError> {
        if min < 0 {
            return Err(CoreError::Validation(format!(
                "amount lower bound must not be negative, got {min}"
            )));
        }
        if max <= min {
            return Err(CoreError::Validation(format!(
                "amount range is empty: [{min}, {max})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Whether `amount` lies within `[min, max)`.
    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= Decimal::from(self.min) && amount < Decimal::from(self.max)
    }

    /// Draw a uniformly distributed whole-unit amount from the range.
    pub fn sample(&self) -> Decimal {
        let value = rand::rng().random_range(self.min..self.max);
        Decimal::from(value)
    }
}

impl Default for AmountRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_AMOUNT,
            max: DEFAULT_MAX_AMOUNT,
        }
    }
}
