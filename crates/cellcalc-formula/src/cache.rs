//! Per-pass cell outcome cache

use crate::error::{FormulaError, FormulaResult};
use cellcalc_core::CellAddress;
use std::collections::btree_map::{self, BTreeMap};

/// Resolved outcome of every cell evaluated so far in one pass
///
/// Each cell holds either its number or the error it failed with. Entries are
/// written once per pass; a second write for the same cell is ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueCache {
    values: BTreeMap<CellAddress, FormulaResult<f64>>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cell's outcome, keeping the first outcome if one was already written
    ///
    /// Returns `false` when the cell already had an outcome.
    pub fn insert(&mut self, cell: CellAddress, outcome: FormulaResult<f64>) -> bool {
        match self.values.entry(cell) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(outcome);
                true
            }
            btree_map::Entry::Occupied(_) => {
                log::warn!("Ignoring second result written for cell {}", cell);
                false
            }
        }
    }

    /// Outcome of a cell, if it has been resolved
    pub fn get(&self, cell: CellAddress) -> Option<&FormulaResult<f64>> {
        self.values.get(&cell)
    }

    /// Numeric value of a cell, if it resolved successfully
    pub fn value(&self, cell: CellAddress) -> Option<f64> {
        match self.values.get(&cell) {
            Some(Ok(n)) => Some(*n),
            _ => None,
        }
    }

    /// Error of a cell, if it failed
    pub fn error(&self, cell: CellAddress) -> Option<&FormulaError> {
        self.values.get(&cell).and_then(|r| r.as_ref().err())
    }

    pub fn contains(&self, cell: CellAddress) -> bool {
        self.values.contains_key(&cell)
    }

    /// All outcomes in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (CellAddress, &FormulaResult<f64>)> + '_ {
        self.values.iter().map(|(cell, outcome)| (*cell, outcome))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_once() {
        let mut cache = ValueCache::new();
        let a1 = CellAddress::new(0, 0);

        assert!(cache.insert(a1, Ok(1.0)));
        assert!(!cache.insert(a1, Err(FormulaError::DivisionByZero)));

        assert_eq!(cache.value(a1), Some(1.0));
        assert_eq!(cache.error(a1), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_error_outcome() {
        let mut cache = ValueCache::new();
        let b2 = CellAddress::new(1, 1);
        cache.insert(b2, Err(FormulaError::DivisionByZero));

        assert!(cache.contains(b2));
        assert_eq!(cache.value(b2), None);
        assert_eq!(cache.error(b2), Some(&FormulaError::DivisionByZero));
    }
}
