//! Month cursor for the date picker.
//!
//! # Responsibility
//! - Walk months forward/backward across year boundaries.
//! - Produce the date keys shown in one month grid.

use crate::model::date_key::DateKey;
use chrono::{Datelike, Local, NaiveDate};

/// Year/month pair shown by the calendar picker. `month` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    /// Returns `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// Month containing the current local day.
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    /// Month containing `key`.
    pub fn containing(key: &DateKey) -> Self {
        let date = key.to_date();
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
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

    pub fn prev(self) -> Self {
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

    pub fn days_in_month(self) -> u32 {
        let next = self.next();
        match (
            self.first_day(),
            NaiveDate::from_ymd_opt(next.year, next.month, 1),
        ) {
            (Some(first), Some(following)) => (following - first).num_days() as u32,
            _ => 0,
        }
    }

    /// Weekday of the 1st, counted from Sunday = 0. Drives leading blanks.
    pub fn first_weekday(self) -> u32 {
        self.first_day()
            .map(|date| date.weekday().num_days_from_sunday())
            .unwrap_or(0)
    }

    /// Key for `day` in this month, `None` when the day does not exist.
    pub fn date_key(self, day: u32) -> Option<DateKey> {
        NaiveDate::from_ymd_opt(self.year, self.month, day).map(DateKey::from_date)
    }

    /// All keys of this month in day order.
    pub fn days(self) -> Vec<DateKey> {
        (1..=self.days_in_month())
            .filter_map(|day| self.date_key(day))
            .collect()
    }

    fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}
