// Error types for the edges of the system (storage, config, ledger keys).
// The reconciliation arithmetic itself never fails.

use thiserror::Error;

/// Result type for cash-checker operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Count entered for a value outside the fixed denomination set
    #[error("Unknown denomination: {0}")]
    UnknownDenomination(u64),

    /// Same denomination supplied twice in one set of counts
    #[error("Duplicate denomination: {0}")]
    DuplicateDenomination(u64),

    /// Stored or requested theme is neither "light" nor "dark"
    #[error("Invalid theme: {0}")]
    InvalidTheme(String),

    /// SQLite error from the preference store
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
