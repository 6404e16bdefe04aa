//! WebStory player entry point.

use std::error::Error;

use tracing_subscriber::EnvFilter;
use webstory_player::config::{LogFormat, PlayerConfig};
use webstory_player::runner::run_player;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Read configuration from environment.
    let config = PlayerConfig::from_env()?;

    // Initialize tracing subscriber.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).pretty().init(),
    }

    tracing::info!(
        asset = %config.asset_path.display(),
        script = %config.script_path.display(),
        tick_ms = config.tick_ms,
        "Starting WebStory player"
    );

    let summary = run_player(&config).await?;
    tracing::info!(
        ticks = summary.ticks,
        steps = summary.steps,
        settled = summary.settled,
        "Script finished"
    );

    Ok(())
}
