use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagwatch::{
    config::Config, database::Database, pipeline::Pipeline, sources::YouTubeClient,
};

#[derive(Parser)]
#[command(name = "tagwatch")]
#[command(version)]
#[command(about = "Scheduled hashtag video tracker")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

/// Entry points; each is invoked independently by an external scheduler.
#[derive(Subcommand)]
enum Command {
    /// Full historical sync of the main table (365-day lookback, global dedupe)
    FullSync,
    /// Incremental append of today's videos to the stacking table
    Daily,
    /// Compute and append today's per-hashtag statistics rows
    Stats,
    /// Append per-channel subscriber snapshots from the main table
    Subscribers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("tagwatch={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tagwatch v{}", env!("CARGO_PKG_VERSION"));

    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }
    config.validate()?;

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database connection established and migrations applied");

    let client = YouTubeClient::new(&config.youtube);
    let pipeline = Pipeline::new(client, &database, &config)?;

    match cli.command {
        Command::FullSync => {
            let report = pipeline.run_full_sync().await?;
            for outcome in report.failed_tags() {
                tracing::warn!(
                    hashtag = %outcome.hashtag,
                    error = outcome.error.as_deref().unwrap_or(""),
                    "Tag failed during full sync"
                );
            }
            info!(
                appended = report.total_appended(),
                duplicates_removed = report.duplicates_removed,
                "Full sync complete"
            );
        }
        Command::Daily => {
            let report = pipeline.run_daily_incremental().await?;
            for outcome in report.failed_tags() {
                tracing::warn!(
                    hashtag = %outcome.hashtag,
                    error = outcome.error.as_deref().unwrap_or(""),
                    "Tag failed during daily run"
                );
            }
            info!(
                appended = report.total_appended(),
                duplicates_removed = report.duplicates_removed,
                "Daily run complete"
            );
        }
        Command::Stats => {
            let report = pipeline.compute_daily_stats().await?;
            info!(
                date = %report.date,
                rows = report.rows.len(),
                "Daily statistics complete"
            );
        }
        Command::Subscribers => {
            let report = pipeline.update_subscriber_history().await?;
            info!(
                channels = report.channels,
                source_rows = report.source_rows,
                "Subscriber history update complete"
            );
        }
    }

    Ok(())
}
