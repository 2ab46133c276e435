//! Channelsheet - enrich a spreadsheet of `YouTube` links with channel metadata.
//!
//! Reads a CSV where one column holds channel URLs, resolves each URL to a
//! channel through the `YouTube` Data API, and writes the description,
//! subscriber, video and view counts plus the latest upload title back into
//! the sheet. API keys and the sheet layout come from a JSON config file.

mod logging;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use channelsheet_core::{
    AppConfig, CsvSheet, EnrichOptions, KeyPool, SheetEnricher, YouTubeDataApi,
};
use tracing::info;

use crate::logging::LoggingConfig;

const USAGE: &str = "usage: channelsheet <sheet.csv> [config.json]";

/// Errors surfaced to the command line.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// The command line did not match the expected shape.
    #[error("invalid arguments\n{USAGE}")]
    Usage,
    /// Logging could not be initialized.
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
    /// Any failure from the enrichment core.
    #[error(transparent)]
    Core(#[from] channelsheet_core::Error),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // Logging may not be up yet, so report on stderr directly.
            eprintln!("channelsheet: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), CliError> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{USAGE}");
        println!();
        println!("Resolves each YouTube URL in the sheet to a channel and fills in");
        println!("channel metadata. The config file must hold at least one API key:");
        println!("{{\"api_keys\": [\"...\"]}}");
        return Ok(());
    }
    let (sheet_path, config_path) = parse_args(&args)?;

    let mut logging_config = LoggingConfig::auto();
    if let Ok(dir) = env::var("CHANNELSHEET_LOG_DIR") {
        logging_config = logging_config.with_log_directory(PathBuf::from(dir));
    }
    let _guard = logging::init(&logging_config)?;

    info!(sheet = %sheet_path.display(), "starting channelsheet");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(&path)?,
        None => AppConfig::load()?,
    };

    let pool = KeyPool::new(config.api_keys.clone(), config.http_timeout())?;
    let api = YouTubeDataApi::new(pool, config.quota_backoff());
    let options = EnrichOptions::from_config(&config);

    let mut sheet = CsvSheet::open(&sheet_path)?;
    let mut enricher = SheetEnricher::new(api, options);
    let stats = enricher.run(&mut sheet)?;

    let executor = enricher.api().executor();
    info!(
        enriched = stats.rows_enriched,
        invalid = stats.rows_invalid,
        skipped = stats.rows_skipped,
        key_rotations = executor.rotations(),
        quota_backoffs = executor.backoffs(),
        "run finished"
    );

    Ok(())
}

fn parse_args(args: &[String]) -> Result<(PathBuf, Option<PathBuf>), CliError> {
    match args {
        [sheet] => Ok((PathBuf::from(sheet), None)),
        [sheet, config] => Ok((PathBuf::from(sheet), Some(PathBuf::from(config)))),
        _ => Err(CliError::Usage),
    }
}
