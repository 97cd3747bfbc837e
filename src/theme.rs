// 🌗 Theme preference - light/dark, read once at startup, saved on toggle

use crate::db::{get_preference, set_preference};
use crate::error::{Error, Result};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        *self == Theme::Dark
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(Error::InvalidTheme(other.to_string())),
        }
    }
}

/// Stored theme; light when nothing (or garbage) is stored
pub fn load_theme(conn: &Connection) -> Result<Theme> {
    let theme = match get_preference(conn, THEME_KEY)? {
        Some(pref) => pref.value.parse().unwrap_or_else(|err| {
            warn!("ignoring stored theme: {}", err);
            Theme::Light
        }),
        None => Theme::Light,
    };
    Ok(theme)
}

pub fn save_theme(conn: &Connection, theme: Theme) -> Result<()> {
    set_preference(conn, THEME_KEY, theme.as_str())
}

/// Flip the stored theme and persist it; returns the new value
pub fn toggle_theme(conn: &Connection) -> Result<Theme> {
    let next = load_theme(conn)?.toggle();
    save_theme(conn, next)?;
    Ok(next)
}
