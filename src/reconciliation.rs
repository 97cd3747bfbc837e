// ⚖️ Reconciliation Engine - does the cash drawer match the claimed total?
//
// Formula:
//   implied_total = Σ count × denomination
//   claimed_total == implied_total  →  balanced
//
// The computation is total: malformed counts read as zero, so there is no
// error path. An imbalance is ordinary output.

use crate::denominations::Ledger;
use crate::normalize::{format_amount, to_integer};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// COMPARISON RESULT
// ============================================================================

/// Direction of a difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    /// Claimed total exceeds what the denominations account for
    Over,
    /// Denominations account for more than the claimed total
    Under,
    Equal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub balanced: bool,
    /// Absolute difference between claimed and implied totals
    pub difference: u128,
    pub sign: Sign,
    pub claimed_total: u128,
    pub implied_total: u128,
}

impl ComparisonResult {
    pub fn is_balanced(&self) -> bool {
        self.balanced
    }

    pub fn has_discrepancy(&self) -> bool {
        !self.balanced
    }

    pub fn summary(&self) -> String {
        format!(
            "claimed {}, counted {}, difference {} ({:?})",
            format_amount(self.claimed_total),
            format_amount(self.implied_total),
            format_amount(self.difference),
            self.sign
        )
    }
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    pub fn new() -> Self {
        ReconciliationEngine
    }

    /// Sum of count × denomination over the whole ledger
    pub fn implied_total(&self, ledger: &Ledger) -> u128 {
        ledger.entries().iter().map(|e| e.subtotal()).sum()
    }

    /// Compare a claimed total against the ledger.
    ///
    /// ```
    /// use cash_checker::{Ledger, ReconciliationEngine, Sign};
    ///
    /// let engine = ReconciliationEngine::new();
    /// let ledger = Ledger::from_counts([(1000, "3")]).unwrap();
    ///
    /// let result = engine.compare(5000, &ledger);
    /// assert!(!result.balanced);
    /// assert_eq!(result.sign, Sign::Over);
    /// assert_eq!(result.difference, 2000);
    /// ```
    pub fn compare(&self, claimed_total: u64, ledger: &Ledger) -> ComparisonResult {
        let claimed = u128::from(claimed_total);
        let implied = self.implied_total(ledger);

        let sign = if claimed == implied {
            Sign::Equal
        } else if claimed > implied {
            Sign::Over
        } else {
            Sign::Under
        };

        let result = ComparisonResult {
            balanced: sign == Sign::Equal,
            difference: claimed.abs_diff(implied),
            sign,
            claimed_total: claimed,
            implied_total: implied,
        };

        debug!(
            claimed = %result.claimed_total,
            implied = %result.implied_total,
            sign = ?result.sign,
            "compared claimed total against ledger"
        );

        result
    }

    /// Same as [`compare`](Self::compare), taking the raw claimed-total text
    pub fn compare_text(&self, claimed_text: &str, ledger: &Ledger) -> ComparisonResult {
        self.compare(to_integer(claimed_text), ledger)
    }
}

// ============================================================================
// TESTS
// ============================================================================
