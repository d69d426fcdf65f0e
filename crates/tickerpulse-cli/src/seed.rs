use std::time::Duration;

use tickerpulse_core::{load_securities, AppConfig};
use tickerpulse_pipeline::SupabaseClient;

/// Insert a zeroed ticker row for every seedable constituent symbol.
///
/// # Errors
///
/// Returns an error if Supabase credentials are missing, the constituents
/// file cannot be loaded, or the insert is rejected.
pub(crate) async fn run_seed_tickers(config: &AppConfig) -> anyhow::Result<()> {
    let credentials = config.supabase_credentials()?;
    let securities = load_securities(&config.constituents_path)?;
    let client = SupabaseClient::new(
        &credentials,
        Duration::from_secs(config.request_timeout_secs),
    )?;

    let inserted = client.seed_tickers(&securities).await?;
    println!(
        "seeded {inserted} of {} constituents into the ticker table",
        securities.len()
    );
    Ok(())
}
