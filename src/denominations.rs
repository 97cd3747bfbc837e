// 💵 Denomination Ledger - fixed note values and the counts entered for them
//
// The set of denominations never changes at runtime; only the count text
// attached to each one does. Order is display order.

use crate::error::{Error, Result};
use crate::normalize::{format_with_separators, to_integer};
use serde::Serialize;
use std::collections::HashSet;

/// Note values tracked by the form, in display order
pub const DENOMINATIONS: [u64; 6] = [1000, 500, 200, 100, 50, 20];

/// One row of the ledger: a denomination and the raw text typed for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub denomination: u64,
    pub count: String,
}

impl LedgerEntry {
    /// Count as an integer (0 when empty or unparsable)
    pub fn count_value(&self) -> u64 {
        to_integer(&self.count)
    }

    /// Value contributed by this row: count × denomination
    pub fn subtotal(&self) -> u128 {
        u128::from(self.count_value()) * u128::from(self.denomination)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Ledger with every count empty
    pub fn new() -> Self {
        Ledger {
            entries: DENOMINATIONS
                .iter()
                .map(|&denomination| LedgerEntry {
                    denomination,
                    count: String::new(),
                })
                .collect(),
        }
    }

    /// Build a ledger from `(denomination, count text)` pairs.
    ///
    /// Denominations not mentioned stay empty. Fails on a value outside
    /// [`DENOMINATIONS`] or on a denomination given more than once.
    pub fn from_counts<I, S>(counts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u64, S)>,
        S: AsRef<str>,
    {
        let mut ledger = Ledger::new();
        let mut seen = HashSet::new();
        for (denomination, count) in counts {
            if !seen.insert(denomination) {
                return Err(Error::DuplicateDenomination(denomination));
            }
            ledger.set_count(denomination, count.as_ref())?;
        }
        Ok(ledger)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn get(&self, denomination: u64) -> Option<&LedgerEntry> {
        self.entries.iter().find(|e| e.denomination == denomination)
    }

    /// Count text for a denomination (None if it is not in the set)
    pub fn count(&self, denomination: u64) -> Option<&str> {
        self.get(denomination).map(|e| e.count.as_str())
    }

    /// Replace the count text for `denomination`, formatted for display.
    ///
    /// The ledger is left untouched when the denomination is unknown.
    pub fn set_count(&mut self, denomination: u64, text: &str) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.denomination == denomination)
            .ok_or(Error::UnknownDenomination(denomination))?;

        entry.count = format_with_separators(text);
        Ok(())
    }

    /// Empty every count; the denomination set is kept
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            entry.count.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.count.is_empty())
    }

    /// Total number of notes entered across all denominations
    pub fn note_count(&self) -> u128 {
        self.entries
            .iter()
            .map(|e| u128::from(e.count_value()))
            .sum()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_denomination(value: u64) -> bool {
    DENOMINATIONS.contains(&value)
}

// ============================================================================
// TESTS
// ============================================================================
