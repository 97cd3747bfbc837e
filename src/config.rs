//! Runtime configuration.
//!
//! Defaults, overridden by environment variables, overridden in turn by CLI
//! flags in the binaries.

use crate::error::{Error, Result};
use crate::messages::Locale;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "CASH_CHECKER_DB";
pub const ENV_PORT: &str = "CASH_CHECKER_PORT";
pub const ENV_LOCALE: &str = "CASH_CHECKER_LOCALE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file holding the theme preference
    pub db_path: PathBuf,

    /// HTTP port for the server binary
    pub port: u16,

    /// Language of labels and result messages
    pub locale: Locale,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("cash-checker.db"),
            port: 3000,
            locale: Locale::Arabic,
        }
    }
}

impl Config {
    /// Defaults with process environment overrides applied
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.is_empty()) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(port) = lookup(ENV_PORT).filter(|v| !v.is_empty()) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{} must be a port number, got '{}'", ENV_PORT, port)))?;
        }

        if let Some(locale) = lookup(ENV_LOCALE).filter(|v| !v.is_empty()) {
            config.locale = locale.parse().map_err(Error::Config)?;
        }

        Ok(config)
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
