//! Next-run computation for wall-clock jobs, in local naive time.

use chrono::{Days, NaiveDateTime, NaiveTime, Weekday};
use std::time::Duration;

use amap_core::calendar::next_occurrence;

/// When a job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Every day at the given time.
    Daily(NaiveTime),
    /// Once a week on the given day and time.
    Weekly(Weekday, NaiveTime),
}

impl Schedule {
    /// First firing strictly after `now`.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        match *self {
            Schedule::Daily(time) => {
                let today = now.date().and_time(time);
                if today > now { today } else { shift(today, 1) }
            }
            Schedule::Weekly(weekday, time) => {
                let candidate = next_occurrence(now.date(), weekday).and_time(time);
                // same weekday, time already passed
                if candidate > now { candidate } else { shift(candidate, 7) }
            }
        }
    }
}

fn shift(at: NaiveDateTime, days: u64) -> NaiveDateTime {
    at.checked_add_days(Days::new(days)).unwrap_or(at)
}

/// Time left from `now` until `next`, zero if already due.
pub fn delay_until(now: NaiveDateTime, next: NaiveDateTime) -> Duration {
    (next - now).to_std().unwrap_or(Duration::ZERO)
}
