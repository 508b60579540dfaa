//! Bounty Timeline Scraper CLI
//!
//! Harvests bounty start/end events for every question ID in the input
//! source that is not yet in the result store.

use std::path::PathBuf;

use bounty_timeline::{
    error::Result,
    logging,
    models::Config,
    pipeline::{ScrapePipeline, reconcile},
    services,
    storage::ParquetStore,
    utils::ensure_dir,
};
use clap::Parser;

/// Stack Overflow Bounty Timeline Scraper
#[derive(Parser, Debug)]
#[command(name = "bounty-scraper", version, about = "Stack Overflow Bounty Timeline Scraper")]
struct Cli {
    /// TOML configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory containing input data files [default: ./input_data]
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Directory to store output data files [default: ./output_data]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Question IDs parquet file in the input directory [default: bounty_question_ids.parquet]
    #[arg(long)]
    ids_file: Option<String>,

    /// Results dataset in the output directory [default: bounty_timeline_results.parquet]
    #[arg(long)]
    results_file: Option<String>,

    /// Number of results to collect before saving to disk [default: 1000]
    #[arg(long)]
    batch_size: Option<usize>,

    /// Page load timeout in seconds [default: 15]
    #[arg(long)]
    timeout: Option<u64>,

    /// Delay in seconds between requests [default: 0.1]
    #[arg(long)]
    delay: Option<f64>,

    /// Disable headless mode for the browser (shows UI)
    #[arg(long)]
    no_headless: bool,

    /// WebDriver endpoint for browser rendering (e.g. http://localhost:9515)
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Log filename (saved in the output directory)
    #[arg(long)]
    log_file: Option<String>,

    /// Logging level: DEBUG, INFO, WARNING, ERROR or CRITICAL [default: INFO]
    #[arg(long)]
    log_level: Option<String>,

    /// Report pending work without fetching anything
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.input_dir {
            config.paths.input_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.paths.output_dir = dir.clone();
        }
        if let Some(file) = &self.ids_file {
            config.paths.ids_file = file.clone();
        }
        if let Some(file) = &self.results_file {
            config.paths.results_file = file.clone();
        }
        if let Some(size) = self.batch_size {
            config.batch.size = size;
        }
        if let Some(timeout) = self.timeout {
            config.fetcher.timeout_secs = timeout;
        }
        if let Some(delay) = self.delay {
            config.fetcher.delay_secs = delay;
        }
        if self.no_headless {
            config.fetcher.headless = false;
        }
        if let Some(url) = &self.webdriver_url {
            config.fetcher.webdriver_url = Some(url.clone());
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    cli.apply(&mut config);
    config.validate()?;

    ensure_dir(&config.paths.output_dir)?;
    let log_path = logging::init(&config.paths.output_dir, &config.logging)?;

    log::info!("Logging to: {}", log_path.display());
    log::info!(
        "Initialized scraper with: input_dir={}, output_dir={}, batch_size={}",
        config.paths.input_dir.display(),
        config.paths.output_dir.display(),
        config.batch.size
    );

    let store = ParquetStore::new(config.results_path());

    if cli.dry_run {
        let work = reconcile(&config.ids_path(), &store)?;
        log::info!(
            "Dry run: {} of {} question IDs pending ({} already processed)",
            work.pending.len(),
            work.total,
            work.processed
        );
        return Ok(());
    }

    let pipeline = ScrapePipeline::new(&config, &store)?;
    let stats = pipeline.run(|| services::connect(&config.fetcher)).await?;

    log::info!(
        "Done! {} of {} pending question IDs scraped",
        stats.scraped.questions,
        stats.pending
    );

    Ok(())
}
