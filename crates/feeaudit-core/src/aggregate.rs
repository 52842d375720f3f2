//! Run x date fee aggregation
//!
//! [`AggregateTable`] folds fee records into `RunId -> date -> sum`. Sums are
//! exact `Decimal` additions, so the resulting mapping does not depend on the
//! order records arrive in. Runs keep the order they were first seen in;
//! dates within a run iterate ascending.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::{AuditError, FeeRecord, RunId};

/// Accumulated fees for one run
#[derive(Clone, Debug, PartialEq)]
pub struct RunEntry {
    pub run: RunId,
    /// Summed fee per date, ascending
    pub fees: BTreeMap<NaiveDate, Decimal>,
}

impl RunEntry {
    fn new(run: RunId) -> Self {
        Self {
            run,
            fees: BTreeMap::new(),
        }
    }

    /// Sum over all dates, saturating at the `Decimal` bounds
    pub fn total(&self) -> Decimal {
        self.fees.values().fold(Decimal::ZERO, |acc, fee| acc.saturating_add(*fee))
    }
}

/// Mapping from run to per-date fee sums
#[derive(Clone, Debug, Default)]
pub struct AggregateTable {
    entries: Vec<RunEntry>,
    index: HashMap<RunId, usize>,
}

impl AggregateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every record into the table
    ///
    /// Records whose sum would overflow `Decimal` are left out and returned.
    pub fn ingest(&mut self, records: impl IntoIterator<Item = FeeRecord>) -> Vec<FeeRecord> {
        records
            .into_iter()
            .filter(|record| self.add(record.run.clone(), record.date, record.fee).is_err())
            .collect()
    }

    /// Add `fee` to the accumulated value for (`run`, `date`)
    ///
    /// Fails with `FeeOverflow` and leaves the table unchanged when the sum
    /// does not fit in a `Decimal`.
    pub fn add(&mut self, run: RunId, date: NaiveDate, fee: Decimal) -> Result<(), AuditError> {
        let sum = self
            .get(&run, date)
            .unwrap_or(Decimal::ZERO)
            .checked_add(fee)
            .ok_or_else(|| AuditError::FeeOverflow {
                run: run.label().to_string(),
                date,
            })?;

        let slot = match self.index.get(&run) {
            Some(&slot) => slot,
            None => {
                let slot = self.entries.len();
                self.index.insert(run.clone(), slot);
                self.entries.push(RunEntry::new(run));
                slot
            }
        };
        self.entries[slot].fees.insert(date, sum);
        Ok(())
    }

    /// Merge another table into this one
    ///
    /// Runs new to `self` are appended in `other`'s order. Stops at the first
    /// sum that overflows.
    pub fn merge(&mut self, other: AggregateTable) -> Result<(), AuditError> {
        for entry in other.entries {
            for (date, fee) in entry.fees {
                self.add(entry.run.clone(), date, fee)?;
            }
        }
        Ok(())
    }

    /// Runs in first-seen order
    pub fn runs(&self) -> impl Iterator<Item = &RunEntry> {
        self.entries.iter()
    }

    pub fn run(&self, run: &RunId) -> Option<&RunEntry> {
        self.index.get(run).map(|&slot| &self.entries[slot])
    }

    pub fn get(&self, run: &RunId, date: NaiveDate) -> Option<Decimal> {
        self.run(run).and_then(|entry| entry.fees.get(&date).copied())
    }

    /// Every date present for any run, ascending
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.entries
            .iter()
            .flat_map(|entry| entry.fees.keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn run_total(&self, run: &RunId) -> Option<Decimal> {
        self.run(run).map(RunEntry::total)
    }

    /// Sum over all runs, saturating at the `Decimal` bounds
    pub fn grand_total(&self) -> Decimal {
        self.entries
            .iter()
            .fold(Decimal::ZERO, |acc, entry| acc.saturating_add(entry.total()))
    }

    /// Number of runs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct runs whose labels are the same number, e.g. `20` and `020`
    ///
    /// These stay separate in the table; callers surface them to the operator.
    pub fn numeric_collisions(&self) -> Vec<Vec<RunId>> {
        let mut groups: BTreeMap<&str, Vec<RunId>> = BTreeMap::new();
        for entry in &self.entries {
            if let Some(key) = entry.run.numeric_key() {
                groups.entry(key).or_default().push(entry.run.clone());
            }
        }
        groups.into_values().filter(|runs| runs.len() > 1).collect()
    }
}

/// Equal when both map the same runs to the same per-date sums; run order is
/// not compared.
impl PartialEq for AggregateTable {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|entry| other.run(&entry.run).is_some_and(|theirs| theirs.fees == entry.fees))
    }
}

/// Records that would overflow are left out; use [`AggregateTable::ingest`]
/// to see them.
impl FromIterator<FeeRecord> for AggregateTable {
    fn from_iter<I: IntoIterator<Item = FeeRecord>>(iter: I) -> Self {
        let mut table = Self::new();
        table.ingest(iter);
        table
    }
}
