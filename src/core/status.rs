//! Settlement status calculation.
//!
//! A rent is settled on the tariff and external buckets together, with the carried
//! previous-due balance checked on its own. The advance bucket is tracked but does
//! not decide whether the month is paid.

use crate::entities::{RentStatus, rent};
use serde::{Deserialize, Serialize};

/// Amounts below this are treated as zero when comparing balances.
pub const EPSILON: f64 = 1e-6;

/// One amount per balance bucket.
///
/// Used for due amounts, paid totals and payment allocations alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Buckets {
    /// Monthly tariff
    pub rent: f64,
    /// Advance (deposit)
    pub advance: f64,
    /// External charges
    pub external: f64,
    /// Balance carried from the previous period
    pub previous_due: f64,
}

impl Buckets {
    /// All buckets zero.
    pub const ZERO: Self = Self {
        rent: 0.0,
        advance: 0.0,
        external: 0.0,
        previous_due: 0.0,
    };

    /// Due amounts of a rent.
    #[must_use]
    pub const fn due_of(rent: &rent::Model) -> Self {
        Self {
            rent: rent.rent_amount,
            advance: rent.advance_amount,
            external: rent.external_amount,
            previous_due: rent.previous_due,
        }
    }

    /// Paid totals of a rent.
    #[must_use]
    pub const fn paid_of(rent: &rent::Model) -> Self {
        Self {
            rent: rent.rent_paid,
            advance: rent.advance_paid,
            external: rent.external_paid,
            previous_due: rent.previous_due_paid,
        }
    }

    /// What is still owed on each bucket of a rent, never below zero.
    #[must_use]
    pub fn outstanding_of(rent: &rent::Model) -> Self {
        let due = Self::due_of(rent);
        let paid = Self::paid_of(rent);
        Self {
            rent: (due.rent - paid.rent).max(0.0),
            advance: (due.advance - paid.advance).max(0.0),
            external: (due.external - paid.external).max(0.0),
            previous_due: (due.previous_due - paid.previous_due).max(0.0),
        }
    }

    /// Bucket-wise sum.
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self {
            rent: self.rent + other.rent,
            advance: self.advance + other.advance,
            external: self.external + other.external,
            previous_due: self.previous_due + other.previous_due,
        }
    }

    /// Whether every bucket is exactly zero.
    ///
    /// Unlike `total() == 0.0`, amounts that cancel out (such as `-5` and `5`) are not zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Sum across all four buckets.
    #[must_use]
    pub fn total(self) -> f64 {
        self.rent + self.advance + self.external + self.previous_due
    }

    /// `(bucket name, amount)` pairs, in storage order.
    #[must_use]
    pub const fn named(self) -> [(&'static str, f64); 4] {
        [
            ("rent", self.rent),
            ("advance", self.advance),
            ("external", self.external),
            ("previous_due", self.previous_due),
        ]
    }
}

/// Derives the settlement status from due and paid buckets.
///
/// - `paid` when tariff plus external charges are covered and nothing carried remains
/// - `partial` when anything was paid on those buckets or on the carried balance
/// - `unpaid` otherwise
///
/// A rent with nothing due is `paid`, even with nothing paid.
#[must_use]
pub fn compute_status(due: Buckets, paid: Buckets) -> RentStatus {
    let total_due = due.rent + due.external;
    let total_paid = paid.rent + paid.external;
    let remaining_previous_due = due.previous_due - paid.previous_due;

    if total_paid + EPSILON >= total_due && remaining_previous_due <= EPSILON {
        RentStatus::Paid
    } else if total_paid > 0.0 || paid.previous_due > 0.0 {
        RentStatus::Partial
    } else {
        RentStatus::Unpaid
    }
}
