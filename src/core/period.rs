//! Billing periods.
//!
//! A period is a calendar month. It is stored on every rent and history row as a
//! zero-padded `YYYY-MM` label and is fixed when the rent is created; it is never
//! re-derived from a timestamp.

use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// A calendar month used as a billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Builds a period, rejecting months outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidArgument {
                message: format!("month must be between 1 and 12, got {month}"),
            });
        }
        Ok(Self { year, month })
    }

    /// The period containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The period before this one.
    #[must_use]
    pub const fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The period after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Calendar year
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Calendar month, 1-based
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// First day of the period.
    #[must_use]
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// The stored `YYYY-MM` label.
    #[must_use]
    pub fn label(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument {
            message: format!("period must look like YYYY-MM, got '{s}'"),
        };

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_label_is_zero_padded() {
        let period = Period::new(2024, 3).unwrap();
        assert_eq!(period.label(), "2024-03");
    }

    #[test]
    fn test_from_date() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 28).unwrap();
        assert_eq!(Period::from_date(date), Period::new(2024, 11).unwrap());
    }

    #[test]
    fn test_previous_wraps_year() {
        let january = Period::new(2025, 1).unwrap();
        assert_eq!(january.previous(), Period::new(2024, 12).unwrap());
        assert_eq!(january.previous().next(), january);
    }

    #[test]
    fn test_next_wraps_year() {
        let december = Period::new(2024, 12).unwrap();
        assert_eq!(december.next().label(), "2025-01");
    }

    #[test]
    fn test_parse_round_trip() {
        let period: Period = "2023-07".parse().unwrap();
        assert_eq!(period.year(), 2023);
        assert_eq!(period.month(), 7);
        assert_eq!(period.first_day(), NaiveDate::from_ymd_opt(2023, 7, 1));
    }

    #[test]
    fn test_parse_rejects_malformed_labels() {
        for bad in ["2023-7", "2023/07", "23-07", "2023-13", "2023-00", "july"] {
            let result = bad.parse::<Period>();
            assert!(
                matches!(result, Err(Error::InvalidArgument { .. })),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_new_rejects_invalid_month() {
        assert!(Period::new(2024, 0).is_err());
        assert!(Period::new(2024, 13).is_err());
    }
}
