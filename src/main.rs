// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use cash_checker::{
    is_denomination, result_message, Config, Ledger, Locale, ReconciliationEngine,
    DENOMINATIONS,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cash-checker", version, about = "Check counted cash against a claimed total")]
struct Cli {
    /// SQLite file for the theme preference (overrides CASH_CHECKER_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Message language: ar or en (overrides CASH_CHECKER_LOCALE)
    #[arg(long, global = true)]
    locale: Option<Locale>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive form (default)
    Tui,

    /// Compare once and print the result (exit code 1 when not balanced)
    Check {
        /// Claimed total, e.g. 3000 or 3,000
        #[arg(long, default_value = "")]
        total: String,

        /// Denomination count as DENOMINATION=COUNT, repeatable
        #[arg(long = "count", value_parser = parse_count)]
        counts: Vec<(u64, String)>,

        /// Print the comparison result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_count(arg: &str) -> std::result::Result<(u64, String), String> {
    let (denomination, count) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected DENOMINATION=COUNT, got '{}'", arg))?;

    let denomination: u64 = denomination
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a denomination", denomination))?;

    if !is_denomination(denomination) {
        return Err(format!(
            "{} is not one of {:?}",
            denomination, DENOMINATIONS
        ));
    }

    Ok((denomination, count.to_string()))
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to read configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }

    match cli.command.unwrap_or(Command::Tui) {
        Command::Check {
            total,
            counts,
            json,
        } => {
            init_tracing("warn");
            let balanced = run_check(&config, &total, counts, json)?;
            Ok(if balanced {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Command::Tui => {
            init_tracing("warn");
            run_ui_mode(&config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_check(
    config: &Config,
    total: &str,
    counts: Vec<(u64, String)>,
    json: bool,
) -> Result<bool> {
    let ledger = Ledger::from_counts(counts)?;
    let result = ReconciliationEngine::new().compare_text(total, &ledger);
    info!("{}", result.summary());

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result_message(&result, config.locale));
    }

    Ok(result.balanced)
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    let conn = cash_checker::open_database(&config.db_path)
        .with_context(|| format!("Failed to open {}", config.db_path.display()))?;

    // Theme is read once here and written on every toggle
    let theme = cash_checker::load_theme(&conn)?;
    info!(theme = %theme, locale = %config.locale, "starting form");

    let mut app = ui::App::new(conn, theme, config.locale);
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    anyhow::bail!("TUI mode not available; rebuild with --features tui or use `cash-checker check`")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("1000=2"), Ok((1000, "2".to_string())));
        assert_eq!(parse_count("20=1,200"), Ok((20, "1,200".to_string())));
        assert!(parse_count("1000").is_err());
        assert!(parse_count("10=2").is_err());
        assert!(parse_count("abc=2").is_err());
    }

    #[test]
    fn test_check_arguments() {
        let cli = Cli::try_parse_from([
            "cash-checker",
            "--locale",
            "en",
            "check",
            "--total",
            "3000",
            "--count",
            "1000=2",
            "--count",
            "500=2",
        ])
        .unwrap();

        assert_eq!(cli.locale, Some(Locale::English));
        match cli.command {
            Some(Command::Check { total, counts, json }) => {
                assert_eq!(total, "3000");
                assert_eq!(counts, vec![(1000, "2".to_string()), (500, "2".to_string())]);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_check() {
        let config = Config::default();

        assert!(run_check(&config, "3000", vec![(1000, "3".to_string())], false).unwrap());
        assert!(!run_check(&config, "5000", vec![(1000, "3".to_string())], true).unwrap());
        assert!(run_check(&config, "", vec![], false).unwrap());
    }

    #[test]
    fn test_run_check_rejects_repeated_count() {
        let config = Config::default();
        let counts = vec![(1000, "2".to_string()), (1000, "5".to_string())];

        let err = run_check(&config, "2000", counts, false).unwrap_err();
        assert!(err.to_string().contains("Duplicate denomination: 1000"));
    }
}
