//! Calendar helpers: the current date, weekday arithmetic and matching of
//! site-localized date labels.
//!
//! The clock is injectable so cache freshness and weekday resolution can be
//! tested against fixed dates.

pub mod months;
pub mod resolver;

pub use months::MonthNames;
pub use resolver::DateResolver;

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use std::sync::Mutex;

/// Source of "today".
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a date, movable with [`FixedClock::set`].
#[derive(Debug)]
pub struct FixedClock {
    date: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date: Mutex::new(date) }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.date.lock().unwrap_or_else(|e| e.into_inner()) = date;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.date.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Days from `today` until the next `target` weekday, 0 when today is the target.
pub fn days_until(today: Weekday, target: Weekday) -> u32 {
    (target.num_days_from_monday() + 7 - today.num_days_from_monday()) % 7
}

/// Upcoming occurrence of `target`, today included.
pub fn next_occurrence(today: NaiveDate, target: Weekday) -> NaiveDate {
    let offset = days_until(today.weekday(), target);
    today
        .checked_add_days(Days::new(u64::from(offset)))
        .unwrap_or(today)
}
