//! Domain data scraped from the AMAP site.

use serde::{Deserialize, Serialize};

/// Products to collect on one distribution date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketDay {
    /// Date label as shown by the site (e.g. "vendredi 12 janvier").
    pub label: String,
    /// Product lines formatted as "quantity x name", in page order.
    pub products: Vec<String>,
}

/// Ordered mapping from date label to product lines.
///
/// Keeps the page's column order. Inserting a label that is already present
/// replaces its products without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasketSnapshot {
    days: Vec<BasketDay>,
}

impl BasketSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: String, products: Vec<String>) {
        match self.days.iter_mut().find(|d| d.label == label) {
            Some(day) => day.products = products,
            None => self.days.push(BasketDay { label, products }),
        }
    }

    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.days.iter().find(|d| d.label == label).map(|d| d.products.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BasketDay> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for BasketSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (label, products) in iter {
            snapshot.insert(label, products);
        }
        snapshot
    }
}

impl<'a> IntoIterator for &'a BasketSnapshot {
    type Item = &'a BasketDay;
    type IntoIter = std::slice::Iter<'a, BasketDay>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}

/// An open membership contract. Identified by its `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub title: String,
    pub deadline: String,
    pub url: String,
}

/// Contracts listed on the site, in page order.
pub type ContractSnapshot = Vec<Contract>;
