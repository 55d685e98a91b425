use std::error::Error;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{error::ErrorKind, Parser};

use crate::constants::period::{MAX_YEAR, MIN_YEAR};
use crate::ingest::{UpdateOptions, UpdateOutcome, Updater};
use crate::source::JsonlRankSource;
use crate::store::StoreLayout;
use crate::types::Period;

#[derive(Debug, Parser)]
#[command(
    name = "crux-ranks-update",
    disable_help_subcommand = true,
    about = "Refresh the sharded domain rank store from the newest dataset dump",
    long_about = "Stream one period of domain rank observations into the sharded \
                  on-disk store, skipping periods the freshness marker says are \
                  already ingested.",
    after_help = "Progress is printed as integer percentages; set RUST_LOG for \
                  structured diagnostics."
)]
struct UpdateCli {
    #[arg(long, help = "Reprocess the target period even if already ingested")]
    force: bool,
    #[arg(
        long,
        value_name = "YYYYMM",
        value_parser = parse_period_arg,
        help = "Ingest a specific period instead of the newest available one"
    )]
    yyyymm: Option<Period>,
    #[arg(
        long,
        value_name = "PATH",
        default_value = "v2/ranks",
        help = "Store root directory (marker and domains tree live here)"
    )]
    root: PathBuf,
    #[arg(
        long,
        value_name = "DIR",
        help = "Directory holding <yyyymm>.jsonl rank dumps"
    )]
    source: PathBuf,
}

fn parse_period_arg(raw: &str) -> Result<Period, String> {
    let value: Period = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a YYYYMM integer"))?;
    let (year, month) = (value / 100, value % 100);
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(format!("year {year} is outside {MIN_YEAR}..={MAX_YEAR}"));
    }
    if NaiveDate::from_ymd_opt(year as i32, month, 1).is_none() {
        return Err(format!("'{raw}' is not a calendar year-month"));
    }
    Ok(value)
}

/// Run the updater CLI over `args` (including the program name).
///
/// Prints progress percentages and the final outcome to stdout; returns an
/// error for any fatal condition so `main` can exit non-zero.
pub fn run_update<I>(args: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let cli = match UpdateCli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    let source = JsonlRankSource::new(cli.source);
    let updater = Updater::new(&source, StoreLayout::new(cli.root));
    let options = UpdateOptions {
        force: cli.force,
        period: cli.yyyymm,
    };

    match updater.run_with_progress(options, |percent| println!("{percent}%"))? {
        UpdateOutcome::Updated { period, rows } => {
            println!("Ingested {rows} rows for {period}");
        }
        UpdateOutcome::AlreadyCurrent { period } => {
            println!("Already up to date with data from {period}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_arg_accepts_valid_year_months() {
        assert_eq!(parse_period_arg("202401").unwrap(), 202401);
        assert_eq!(parse_period_arg("209912").unwrap(), 209912);
    }

    #[test]
    fn period_arg_rejects_bad_months_and_non_numbers() {
        assert!(parse_period_arg("202400").is_err());
        assert!(parse_period_arg("202413").is_err());
        assert!(parse_period_arg("199912").is_err());
        assert!(parse_period_arg("2024-01").is_err());
        assert!(parse_period_arg("latest").is_err());
    }
}
