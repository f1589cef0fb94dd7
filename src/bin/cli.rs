//! English to Tunisian scraper CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use en_tn_scraper::{
    error::Result,
    models::Config,
    pipeline::{Scraper, Shutdown},
    services::HttpTranslator,
    storage::{ProgressStore, read_items},
};

/// Resumable, rate-limited sentence translation scraper
#[derive(Parser, Debug)]
#[command(
    name = "en-tn-scraper",
    version,
    about = "English to Tunisian Translation Scraper"
)]

struct Cli {
    /// Directory holding config.toml, the input and all output files
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Hide the progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate every input sentence not yet in the output file
    Run {
        /// Path to the input TSV (default: paths.input from config)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Retry sentences recorded in the failure file
    Retry,

    /// Validate configuration file
    Validate,

    /// Show progress of the current job
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.data_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    let mut paths = config.paths.resolve(&cli.data_dir);

    log::info!("Loaded configuration from {}", cli.data_dir.display());

    match cli.command {
        Command::Run { input } => {
            if let Some(input) = input {
                paths.input = input;
            }
            config.validate()?;

            log::info!("Starting English-Tunisian Translation Scraper");
            log::info!("Input: {}", paths.input.display());
            log::info!("Output: {}", paths.output.display());

            let items = read_items(&paths.input, &config.input.language)?;
            log::info!(
                "Found {} sentences tagged '{}'",
                items.len(),
                config.input.language
            );

            let shutdown = Shutdown::new();
            shutdown.listen_for_ctrl_c();

            let translator = HttpTranslator::new(&config.endpoint)?;
            log::info!("Endpoint: {}", translator.url());

            let scraper = Scraper::new(translator, &config, paths)?
                .with_shutdown(shutdown)
                .with_progress(!cli.quiet);
            scraper.run(items).await?;
        }

        Command::Retry => {
            config.validate()?;

            let shutdown = Shutdown::new();
            shutdown.listen_for_ctrl_c();

            let translator = HttpTranslator::new(&config.endpoint)?;
            let scraper = Scraper::new(translator, &config, paths)?
                .with_shutdown(shutdown)
                .with_progress(!cli.quiet);
            scraper.retry_failed().await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
            log::info!("  Endpoint: {}", config.endpoint.url);
            log::info!("  Timeout: {}s", config.endpoint.timeout_secs);
            log::info!(
                "  Pacing: {}ms between items, {} attempts, {}ms retry delay",
                config.pacing.request_delay_ms,
                config.pacing.max_retries,
                config.pacing.retry_delay_ms
            );
            log::info!("  Input language: {}", config.input.language);
        }

        Command::Info => {
            let store = ProgressStore::new(&paths.output, &paths.failed, &paths.checkpoint);

            log::info!("Data directory: {}", cli.data_dir.display());
            match store.read_ids() {
                Ok(done) => log::info!("Translated sentences: {}", done.len()),
                Err(e) => log::warn!("Output unreadable, next run will set it aside: {}", e),
            }
            if paths.failed.exists() {
                log::info!(
                    "Failed sentences awaiting retry: {}",
                    store.already_failed().len()
                );
            } else {
                log::info!("Failure file: not found");
            }

            match store.load_checkpoint() {
                Some(id) => log::info!("Last processed ID: {}", id),
                None => log::info!("No checkpoint found yet."),
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
