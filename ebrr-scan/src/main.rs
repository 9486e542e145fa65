//! ebrr-scan - eBird records review scan
//!
//! Fetches a state's county list and the eBird taxonomy, loads the review
//! policy document, scans every county for the requested dates and writes
//! the flagged records to `<reports_dir>/records_to_review_<YYYY>_<MM>.json`.
//!
//! An interrupted scan resumes from its checkpoint on the next run with the
//! same arguments.

use std::num::NonZeroU32;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ebrr_common::config::{self, TomlConfig};
use ebrr_scan::services::{
    validate_policy, write_report, EbirdClient, PolicyDocument, RetryingDataAccess,
    ScanOrchestrator, ScanWindow,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for ebrr-scan
#[derive(Parser, Debug)]
#[command(name = "ebrr-scan")]
#[command(about = "Find eBird records that need review by a records committee")]
#[command(version)]
struct Args {
    /// Observation year
    #[arg(long)]
    year: i32,

    /// Observation month (1-12, 0 for the whole year)
    #[arg(long)]
    month: u32,

    /// Observation day (1-31, 0 for the whole month)
    #[arg(long, default_value_t = 0)]
    day: u32,

    /// State region code
    #[arg(long, default_value = "US-VA")]
    state: String,

    /// JSON document with state_list, review_species and county_groups
    #[arg(long, default_value = "data/review_species.json")]
    review_species_file: PathBuf,

    /// TOML config file (default: <config dir>/ebrr/ebrr.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Checkpoint file used to resume an interrupted scan
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Directory for result files
    #[arg(long)]
    reports_dir: Option<PathBuf>,

    /// eBird API key (overrides the config file)
    #[arg(long, env = "EBIRDAPIKEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Log progress at info level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The config file may name the log level, so it is read first
    let toml_config = TomlConfig::load_or_default(args.config.as_deref());
    init_tracing(&args, toml_config.as_ref().ok());

    let toml_config = toml_config.context("Failed to load configuration")?;

    if let Err(e) = run(args, toml_config).await {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

/// RUST_LOG wins, then --verbose, then the config file, then warnings only
fn init_tracing(args: &Args, toml_config: Option<&TomlConfig>) {
    let fallback = if args.verbose {
        "info".to_string()
    } else {
        toml_config
            .and_then(|c| c.logging.level.clone())
            .unwrap_or_else(|| "warn".to_string())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run(args: Args, toml_config: TomlConfig) -> Result<()> {
    info!("Starting ebrr-scan v{}", env!("CARGO_PKG_VERSION"));

    let window = ScanWindow::new(args.year, args.month, args.day)?;

    let api_key = config::resolve_api_key(args.api_key.as_deref(), &toml_config)?;
    let checkpoint_path = config::resolve_checkpoint_path(args.checkpoint.as_deref(), &toml_config);
    let reports_dir = config::resolve_reports_dir(args.reports_dir.as_deref(), &toml_config);
    let rate = NonZeroU32::new(config::resolve_requests_per_second(&toml_config))
        .context("Request rate must be positive")?;

    let client = EbirdClient::new(api_key, rate).context("Failed to build eBird client")?;

    let taxonomy = client
        .fetch_taxonomy()
        .await
        .context("Failed to fetch eBird taxonomy")?;
    info!("Taxonomy has {} entries", taxonomy.len());

    let counties = client
        .fetch_regions("subnational2", &args.state)
        .await
        .with_context(|| format!("Failed to fetch counties of {}", args.state))?;
    info!("{} has {} counties", args.state, counties.len());

    let document = PolicyDocument::load(&args.review_species_file)?;
    validate_policy(&document, &counties, Some(&taxonomy));

    let orchestrator = ScanOrchestrator::new(RetryingDataAccess::new(client), checkpoint_path);
    let records = orchestrator
        .scan(&counties, window, &document.baseline, &document.policy)
        .await
        .context("Scan failed")?;

    let flagged: usize = records.iter().map(|c| c.records.len()).sum();
    info!(
        "Scan complete: {} records to review in {} counties",
        flagged,
        records.len()
    );

    let today = chrono::Local::now().date_naive();
    if let Some(path) = write_report(
        &reports_dir,
        &args.state,
        args.year,
        args.month,
        today,
        &records,
    )? {
        println!("{}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_parse_minimal() {
        let args = Args::try_parse_from(["ebrr-scan", "--year", "2024", "--month", "5"]).unwrap();
        assert_eq!(args.year, 2024);
        assert_eq!(args.month, 5);
        assert_eq!(args.day, 0);
        assert_eq!(args.state, "US-VA");
    }

    #[test]
    fn test_api_key_reads_environment() {
        let command = Args::command();
        let api_key = command
            .get_arguments()
            .find(|arg| arg.get_id() == "api_key")
            .unwrap();
        assert_eq!(
            api_key.get_env(),
            Some(std::ffi::OsStr::new(config::API_KEY_ENV_VAR))
        );
    }
}
