//! Change detection between two contract snapshots.
//!
//! Contracts are keyed by `url`. The delta is additive only: contracts that
//! disappeared from the site are not reported.

use serde::Serialize;
use std::collections::HashMap;

use crate::model::{Contract, ContractSnapshot};

/// Why a contract is part of a delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Url not present in the previous snapshot.
    New,
    /// Same url, different title or deadline.
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractChange {
    pub kind: ChangeKind,
    pub contract: Contract,
}

/// New or updated contracts, in the order of the newer snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContractDelta {
    changes: Vec<ContractChange>,
}

impl ContractDelta {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContractChange> {
        self.changes.iter()
    }

    pub fn contracts(&self) -> impl Iterator<Item = &Contract> {
        self.changes.iter().map(|c| &c.contract)
    }
}

impl IntoIterator for ContractDelta {
    type Item = ContractChange;
    type IntoIter = std::vec::IntoIter<ContractChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

/// Compare `new` against `old`.
///
/// Without a previous snapshot, or with an empty one, the delta is empty, so
/// a cold start never notifies about every contract at once.
pub fn diff_contracts(old: Option<&ContractSnapshot>, new: &ContractSnapshot) -> ContractDelta {
    let Some(old) = old.filter(|o| !o.is_empty()) else {
        return ContractDelta::default();
    };

    let known: HashMap<&str, &Contract> = old.iter().map(|c| (c.url.as_str(), c)).collect();

    let changes = new
        .iter()
        .filter_map(|contract| {
            let kind = match known.get(contract.url.as_str()) {
                None => ChangeKind::New,
                Some(prev) if prev.title != contract.title || prev.deadline != contract.deadline => {
                    ChangeKind::Updated
                }
                Some(_) => return None,
            };
            Some(ContractChange { kind, contract: contract.clone() })
        })
        .collect();

    ContractDelta { changes }
}
