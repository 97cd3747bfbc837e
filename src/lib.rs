// Cash Checker - Core Library
// Exposes all modules for use in the CLI/TUI, the API server, and tests

pub mod config;
pub mod db;
pub mod denominations;
pub mod error;
pub mod form;
pub mod messages;
pub mod normalize;
pub mod reconciliation;
pub mod theme;

// Re-export commonly used types
pub use config::Config;
pub use db::{get_preference, open_database, set_preference, setup_database, Preference};
pub use denominations::{is_denomination, Ledger, LedgerEntry, DENOMINATIONS};
pub use error::{Error, Result};
pub use form::FormSession;
pub use messages::{denomination_label, result_message, Locale};
pub use normalize::{format_amount, format_with_separators, normalize_digits, to_integer};
pub use reconciliation::{ComparisonResult, ReconciliationEngine, Sign};
pub use theme::{load_theme, save_theme, toggle_theme, Theme};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
