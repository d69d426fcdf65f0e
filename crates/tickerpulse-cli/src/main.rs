mod produce;
mod seed;
mod terms;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tickerpulse")]
#[command(about = "Forward Reddit posts that mention index tickers to a message sink")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search the subreddit and publish posts that mention tickers
    Produce {
        /// Write messages to stdout as JSON lines instead of the configured sink
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the loaded search terms and the batched search queries
    Terms,
    /// Seed the Supabase ticker table from the constituents CSV
    SeedTickers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = tickerpulse_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // Logs go to stderr so dry-run output on stdout stays machine readable.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, sink = %config.sink, "configuration loaded");

    match cli.command {
        Commands::Produce { dry_run } => produce::run_produce(&config, dry_run).await,
        Commands::Terms => terms::run_terms(&config),
        Commands::SeedTickers => seed::run_seed_tickers(&config).await,
    }
}
