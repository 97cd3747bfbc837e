// 📝 Form Session - the in-memory state behind one open form
//
// Owns the claimed-total text, the denomination ledger and the last result.
// Text is formatted with separators as it is entered; arithmetic happens only
// on compare().

use crate::denominations::Ledger;
use crate::error::Result;
use crate::messages::{result_message, Locale};
use crate::normalize::format_with_separators;
use crate::reconciliation::{ComparisonResult, ReconciliationEngine};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct FormSession {
    claimed_total: String,
    ledger: Ledger,
    result: Option<ComparisonResult>,
    engine: ReconciliationEngine,
}

impl FormSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claimed_total(&self) -> &str {
        &self.claimed_total
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Last comparison, if any
    pub fn result(&self) -> Option<&ComparisonResult> {
        self.result.as_ref()
    }

    pub fn set_claimed_total(&mut self, text: &str) {
        self.claimed_total = format_with_separators(text);
    }

    pub fn set_count(&mut self, denomination: u64, text: &str) -> Result<()> {
        self.ledger.set_count(denomination, text)
    }

    /// Compare and keep the result until the next compare or reset
    pub fn compare(&mut self) -> &ComparisonResult {
        let result = self.engine.compare_text(&self.claimed_total, &self.ledger);
        info!(balanced = result.balanced, "{}", result.summary());
        self.result.insert(result)
    }

    /// Clear every field and drop the last result. Idempotent.
    pub fn reset(&mut self) {
        self.claimed_total.clear();
        self.ledger.clear();
        self.result = None;
    }

    pub fn is_empty(&self) -> bool {
        self.claimed_total.is_empty() && self.ledger.is_empty() && self.result.is_none()
    }

    /// Banner text for the last result
    pub fn message(&self, locale: Locale) -> Option<String> {
        self.result.as_ref().map(|r| result_message(r, locale))
    }
}
