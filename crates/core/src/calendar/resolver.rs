//! Finds the basket column for the upcoming distribution day.
//!
//! Labels come from the site as free text ("vendredi 10 mai"). A label
//! matches when, once trimmed and lower-cased, it contains both the two-digit
//! day of month and the month name of the target date.

use chrono::{NaiveDate, Weekday};

use super::{MonthNames, next_occurrence};
use crate::model::{BasketDay, BasketSnapshot};

/// Matches basket labels against the next occurrence of a weekday.
#[derive(Debug, Clone)]
pub struct DateResolver {
    target: Weekday,
    months: MonthNames,
}

impl Default for DateResolver {
    fn default() -> Self {
        Self { target: Weekday::Fri, months: MonthNames::french() }
    }
}

impl DateResolver {
    pub fn new(target: Weekday, months: MonthNames) -> Self {
        Self { target, months }
    }

    pub fn target(&self) -> Weekday {
        self.target
    }

    /// Date of the upcoming target weekday, `today` included.
    pub fn target_date(&self, today: NaiveDate) -> NaiveDate {
        next_occurrence(today, self.target)
    }

    /// Whether `label` denotes `date`.
    pub fn matches(&self, label: &str, date: NaiveDate) -> bool {
        let clean = label.trim().to_lowercase();
        let day = date.format("%d").to_string();
        clean.contains(&day) && clean.contains(self.months.name(date))
    }

    /// First snapshot entry for the upcoming target weekday.
    pub fn find<'a>(&self, snapshot: &'a BasketSnapshot, today: NaiveDate) -> Option<&'a BasketDay> {
        let target = self.target_date(today);
        let found = snapshot.iter().find(|day| self.matches(&day.label, target));
        if found.is_none() {
            tracing::debug!(%target, labels = snapshot.len(), "no basket label matches target date");
        }
        found
    }
}
