use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use plasma_common::{EntityKind, IndexerConfig};
use plasma_indexer::{event_lines, replay};
use plasma_store::{MemoryEntityStore, PgEntityStore};

#[derive(Parser)]
#[command(
    name = "plasma-indexer",
    about = "Replay Plasma tracking contract events into the entity store"
)]
struct Cli {
    /// Newline-delimited JSON file of decoded chain events, in chain order
    #[arg(long)]
    events: PathBuf,

    /// Print the resulting metadata records after the replay
    #[arg(long)]
    dump: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = IndexerConfig::from_env()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive("plasma=info".parse()?);
    if config.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Plasma indexer starting...");
    config.log_redacted();

    let file = tokio::fs::File::open(&cli.events)
        .await
        .with_context(|| format!("Failed to open events file: {}", cli.events.display()))?;
    let events = event_lines(BufReader::new(file), cli.events.display().to_string());

    match config.database_url.as_deref() {
        Some(url) => {
            let store = PgEntityStore::connect(url, config.db_max_connections).await?;
            store.migrate().await?;
            info!("Connected to database");

            let (stats, store) = replay(store, events, config.source_address.clone()).await?;
            print_json(&stats)?;

            if cli.dump {
                let metadata: Vec<serde_json::Value> = store
                    .read_kind(EntityKind::Metadata)
                    .await?
                    .into_iter()
                    .map(|row| row.payload)
                    .collect();
                print_json(&metadata)?;
            }
        }
        None => {
            let store = MemoryEntityStore::new();
            let (stats, store) = replay(store, events, config.source_address.clone()).await?;
            print_json(&stats)?;

            if cli.dump {
                let metadata: Vec<serde_json::Value> = store
                    .snapshot()
                    .into_iter()
                    .filter(|(kind, _, _)| *kind == EntityKind::Metadata)
                    .map(|(_, _, record)| record)
                    .collect();
                print_json(&metadata)?;
            }
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
