//! sentiment-harvest: poll a social search endpoint, tag every post with a
//! sentiment label, and report the label distribution.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌────────────┐ Session ┌──────────┐  Batch  ┌────────────┐  CSV  ┌──────────┐
//! │ session.rs │ ──────► │ fetch.rs │ ──────► │ collect.rs │ ────► │ store.rs │
//! └────────────┘         └──────────┘         └────────────┘       └──────────┘
//!       │                     │                     │                   │
//!       ▼                     ▼                     ▼                   ▼
//!   source/ (Login)    source/ (SearchSource)   sentiment/          report.rs
//! ```
//!
//! * **`source/`**: the `SearchSource` trait, the normalised `PostRecord`,
//!   and the HTTP client for the X API.
//! * **`session`**: loads the saved session token or logs in fresh.
//! * **`fetch`**: first page or paced continuation, normalised to records.
//! * **`collect`**: the fetch, label, persist loop and its stop conditions.
//! * **`clean`** / **`sentiment`**: text cleaning and polarity labelling.
//! * **`store`** / **`report`**: batch files and the final distribution.
//! * **`main`**: parses args, loads config, wires everything together.

mod clean;
mod collect;
mod config;
mod error;
mod fetch;
mod logging;
mod pacing;
mod report;
mod sentiment;
mod session;
mod source;
mod store;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use collect::Collector;
use config::Config;
use fetch::PageFetcher;
use pacing::ThreadSleeper;
use sentiment::Classifier;
use session::{Authenticator, SessionStore};
use source::XClient;
use store::BatchStore;

#[derive(Parser)]
#[command(name = "sentiment-harvest", version)]
#[command(about = "Collect posts matching a search, label their sentiment, and report the mix")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Log filter, e.g. `info` or `sentiment_harvest=debug` (RUST_LOG wins)
    #[arg(short, long, global = true, default_value = logging::DEFAULT_LEVEL)]
    log_level: String,
}

#[derive(Subcommand)]
enum Command {
    /// Authenticate, collect until done, then print the report (default)
    Run,

    /// Print the report for an existing output directory
    Report {
        /// Directory of batch files (defaults to `collect.output_dir`)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Clean and score a single piece of text
    Classify {
        #[arg(short, long)]
        text: String,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&cli.config),
        Command::Report { dir } => print_report(&BatchStore::new(report_dir(dir, &cli.config)?)),
        Command::Classify { text } => {
            print!("{}", classify(&text));
            Ok(())
        }
    }
}

fn run(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;

    // -- authenticate (fatal on failure) -------------------------------------
    let client = XClient::new(&config.collect.base_url, &config.collect.language)?;
    let session = Authenticator::new(&client, SessionStore::new(&config.collect.cookie_file))
        .ensure_authenticated(&config.x)
        .context("Failed to authenticate")?;

    // -- collect ---------------------------------------------------------------
    let classifier = Classifier::new();
    let store = BatchStore::new(&config.collect.output_dir);
    info!(dir = %store.dir().display(), "Writing batches");
    let mut sleeper = ThreadSleeper;
    let fetcher = PageFetcher::new(&client, &session, config.search_query(), config.pacing);

    let summary = Collector::new(fetcher, &classifier, &store, &mut sleeper)
        .with_minimum(config.collect.minimum_posts)
        .with_retry(config.retry)
        .run()?;
    info!(
        files = summary.files.len(),
        reason = ?summary.stop_reason,
        "Collection finished with {} tweets",
        summary.collected_total
    );

    // -- aggregate -------------------------------------------------------------
    print_report(&store)
}

fn print_report(store: &BatchStore) -> Result<()> {
    if let Some(distribution) = report::aggregate(store)? {
        print!("{}", distribution.render());
    }
    Ok(())
}

/// An explicit `--dir` wins; otherwise the config's output directory.
fn report_dir(dir: Option<PathBuf>, config_path: &Path) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => Ok(Config::load(config_path)?.collect.output_dir),
    }
}

fn classify(text: &str) -> String {
    let classifier = Classifier::new();
    let polarity = classifier.score(text);
    format!(
        "clean:     {}\npolarity:  {polarity:.3}\nsentiment: {}\n",
        clean::clean_text(text),
        sentiment::Sentiment::from_polarity(polarity)
    )
}
