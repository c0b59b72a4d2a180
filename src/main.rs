//! CSE-Extractor entry point
//!
//! Searches Google CSE for each query in a CSV/TSV column, saves raw
//! results, extracts page text, and saves the final records.

use anyhow::Result;
use clap::Parser;
use cse_extractor::config::Settings;
use cse_extractor::data::read_queries;
use cse_extractor::pipeline::Pipeline;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Search Google CSE, save raw results, extract text, save final results.
#[derive(Parser, Debug)]
#[command(name = "cse-extractor", version, about)]
struct Args {
    /// Input CSV/TSV file containing queries
    #[arg(long)]
    input_file: PathBuf,

    /// Column name containing search queries
    #[arg(long)]
    query_column: String,

    /// Number of Google Search result pages per query
    #[arg(short, long)]
    pages: Option<u32>,

    /// Results per CSE page (1-10)
    #[arg(short, long)]
    num_results: Option<u8>,

    /// Delay between CSE API requests (seconds)
    #[arg(short, long)]
    delay: Option<f64>,

    /// Timeout for URL text extraction (seconds)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Restrict search to a specific site
    #[arg(long)]
    site_search: Option<String>,

    /// Number of queries to process between batch writes
    #[arg(long)]
    batch_size: Option<usize>,

    /// Base path and prefix for raw search batch files
    #[arg(long)]
    search_output_base: Option<String>,

    /// Base path and prefix for extracted text batch files
    #[arg(long)]
    extracted_output_base: Option<String>,

    /// Path to a YAML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    info!("Starting cse-extractor v{}", cse_extractor::VERSION);

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    apply_overrides(&mut settings, &args);

    if let Err(e) = settings.validate() {
        error!("{}. Exiting.", e);
        std::process::exit(1);
    }
    info!("API Key and CSE ID loaded successfully.");

    let queries = read_queries(&args.input_file, &args.query_column)?;
    if queries.is_empty() {
        info!("No queries to process. Exiting.");
        return Ok(());
    }

    let batch_size = settings.output.batch_size;
    let pipeline = Pipeline::new(settings)?;
    let summary = pipeline.run(&queries).await?;
    summary.print(
        &args.input_file.display().to_string(),
        &args.query_column,
        batch_size,
    );

    info!("Finished.");
    Ok(())
}

/// Load settings from an explicit flag, an environment variable, or the
/// default locations; fall back to defaults. Environment credentials are
/// merged in last.
fn load_settings(config: Option<&Path>) -> Result<Settings> {
    let mut settings = if let Some(path) = config {
        info!("Loading settings from: {}", path.display());
        Settings::from_file(path)?
    } else {
        let mut paths = vec![
            PathBuf::from("settings.yml"),
            PathBuf::from("config/settings.yml"),
        ];
        if let Ok(path) = std::env::var("CSE_EXTRACTOR_SETTINGS_PATH") {
            paths.insert(0, PathBuf::from(path));
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("cse-extractor/settings.yml"));
        }

        match paths.iter().find(|path| path.exists()) {
            Some(path) => {
                info!("Loading settings from: {}", path.display());
                Settings::from_file(path)?
            }
            None => {
                info!("No settings file found, using defaults");
                Settings::default()
            }
        }
    };

    settings.merge_env();
    Ok(settings)
}

/// Apply command-line overrides on top of the loaded settings
fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(pages) = args.pages {
        settings.search.pages = pages;
    }
    if let Some(num_results) = args.num_results {
        settings.search.num_results = if (1..=10).contains(&num_results) {
            num_results
        } else {
            warn!(
                "Num results ({}) out of range (1-10). Setting to 10.",
                num_results
            );
            10
        };
    }
    if let Some(delay) = args.delay {
        settings.search.request_delay = delay;
    }
    if let Some(timeout) = args.timeout {
        settings.extraction.timeout = timeout;
    }
    if args.site_search.is_some() {
        settings.search.site_search = args.site_search.clone();
    }
    if let Some(batch_size) = args.batch_size {
        settings.output.batch_size = if batch_size == 0 {
            warn!("Batch size must be positive. Setting to 1.");
            1
        } else {
            batch_size
        };
    }
    if let Some(base) = &args.search_output_base {
        settings.output.search_base = base.clone();
    }
    if let Some(base) = &args.extracted_output_base {
        settings.output.extracted_base = base.clone();
    }
}
