//! Month-name tables used to render dates the way the site prints them.

use chrono::{Datelike, NaiveDate};

const FRENCH: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Lower-case month names, January first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthNames {
    names: [String; 12],
}

impl MonthNames {
    /// Build a table from twelve names. Names are lower-cased.
    pub fn new(names: [&str; 12]) -> Self {
        Self { names: names.map(str::to_lowercase) }
    }

    pub fn french() -> Self {
        Self::new(FRENCH)
    }

    pub fn name(&self, date: NaiveDate) -> &str {
        &self.names[date.month0() as usize]
    }
}

impl Default for MonthNames {
    fn default() -> Self {
        Self::french()
    }
}
