//! MarketPulse command-line tool.
//!
//! Runs ingestion, feature building, training and prediction against the
//! configured database. The web API lives in the `server` binary.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use marketpulse::application::system::Application;
use marketpulse::config::Config;
use marketpulse::domain::ports::ObservationFeed;
use marketpulse::infrastructure::feeds::CsvMarketFeed;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn, Level};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "MarketPulse macro and market pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh macro series from the FRED API
    IngestFred,
    /// Import market closes from CSV files (defaults to the configured SPY and VIX files)
    ImportCsv {
        /// CSV with date, close and volume columns for SPY
        #[arg(long)]
        spy: Option<PathBuf>,

        /// CSV with date and close columns for the VIX
        #[arg(long)]
        vix: Option<PathBuf>,
    },
    /// Fetch articles from the configured RSS feeds
    FetchNews,
    /// Run sentiment, summary and topic tagging on unannotated articles
    AnnotateNews {
        /// Maximum number of articles to annotate
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Build the feature table (all dates, or a single date)
    BuildFeatures {
        /// Build only this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Train the SPX direction model and store a new artifact
    Train,
    /// Predict SPX direction for the latest feature row
    Predict,
    /// Print the macro snapshot with composite scores
    Snapshot,
    /// Run the full update pipeline
    Update,
    /// Print the configuration readiness report
    Check,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    let config = Config::from_env()?;

    if let Commands::Check = command {
        let report = config.readiness();
        println!("{}", serde_json::to_string_pretty(&report)?);
        if !report.ready {
            anyhow::bail!("Missing required settings: {}", report.missing.join(", "));
        }
        return Ok(());
    }

    let app = Application::build(config).await?;

    match command {
        Commands::IngestFred => {
            let feed = app
                .fred_feed()
                .context("FRED_API_KEY is not set in environment")?;
            let report = app.ingestion.ingest(&feed).await?;
            print_json(&report)?;
        }
        Commands::ImportCsv { spy, vix } => {
            let mut feeds = Vec::new();
            match (spy, vix) {
                (None, None) => feeds.extend(app.market_feeds()),
                (spy, vix) => {
                    feeds.extend(spy.map(CsvMarketFeed::spy));
                    feeds.extend(vix.map(CsvMarketFeed::vix));
                }
            }
            for feed in &feeds {
                match app.ingestion.ingest(feed).await {
                    Ok(report) => print_json(&report)?,
                    Err(e) => warn!(
                        "{} import from {} failed: {:#}",
                        feed.name(),
                        feed.path().display(),
                        e
                    ),
                }
            }
        }
        Commands::FetchNews => {
            let feeds = app.news_feeds();
            if feeds.is_empty() {
                warn!("No RSS feeds configured");
            }
            for feed in &feeds {
                match app.news.ingest(feed).await {
                    Ok(count) => info!("Stored {} articles", count),
                    Err(e) => warn!("News feed failed: {:#}", e),
                }
            }
        }
        Commands::AnnotateNews { limit } => {
            let limit = limit.unwrap_or(app.config.model.annotate_limit);
            let report = app.news.annotate_pending(limit).await?;
            print_json(&report)?;
        }
        Commands::BuildFeatures { date } => match date {
            Some(raw) => {
                let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .with_context(|| format!("Invalid date {}, expected YYYY-MM-DD", raw))?;
                let row = app.feature_builder.build_features_for_date(date).await?;
                print_json(&row)?;
            }
            None => {
                let report = app.feature_builder.build_features_for_all_dates().await?;
                print_json(&report)?;
            }
        },
        Commands::Train => {
            let report = app.trainer.train_direction_model().await?;
            print_json(&report)?;
        }
        Commands::Predict => {
            let prediction = app.predictor.predict_latest_direction().await?;
            print_json(&prediction)?;
        }
        Commands::Snapshot => match app.composite.macro_snapshot().await? {
            Some(snapshot) => print_json(&snapshot)?,
            None => anyhow::bail!("No FeatureFrame data available. Run build-features first."),
        },
        Commands::Update => {
            let report = app.update_pipeline().run().await;
            print_json(&report)?;
            if !report.all_ok() {
                warn!("Failed steps: {}", report.failed_steps().join(", "));
            }
        }
        // Reported above without opening the database.
        Commands::Check => {}
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
