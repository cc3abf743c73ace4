//! Print the weekly song view for a `songs.json` file as JSON.
//!
//! Usage: `weekly <songs.json> [upcoming-limit]`

use anyhow::Context;
use choir_core::dates;
use choir_store::{InMemoryStore, SongCatalog, StoreClient, StoreConfig, load_song_file};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // CHOIR_LOG_LEVEL, then RUST_LOG, then `info`.
    let log_env = std::env::var("CHOIR_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: weekly <songs.json> [upcoming-limit]")?;
    let limit = match args.next() {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("upcoming limit is not a number: {raw}"))?,
        None => 5,
    };

    let config = StoreConfig::from_env()?;
    tracing::info!(
        environment = %config.environment,
        base_url = %config.base_url,
        "weekly: using in-memory store"
    );

    let songs = load_song_file(&path)
        .await
        .with_context(|| format!("reading {path}"))?;
    let catalog = SongCatalog::new(StoreClient::new(config, InMemoryStore::new()));
    catalog.seed(&songs).await?;

    let output = json!({
        "today": dates::today_iso(),
        "sundays": dates::upcoming_sundays_from_today(6),
        "weekly": catalog.weekly_view().await?,
        "upcoming": catalog.upcoming(limit).await?,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
