//! Cirrus - an MPD-compatible daemon for a remote music catalogue

use anyhow::Result;
use cirrus::catalogue::RestCatalogue;
use cirrus::config::Config;
use cirrus::content::ContentProvider;
use cirrus::daemon::Daemon;
use cirrus::players;
use cirrus::session;
use cirrus::store::Store;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Listen address, overrides the configured one
    #[arg(short, long)]
    address: Option<String>,

    /// Audio backend (rodio, null), overrides the configured one
    #[arg(short, long)]
    player: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("☁️ Cirrus v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    let address = args.address.unwrap_or_else(|| config.listen_address.clone());
    let backend = args.player.unwrap_or_else(|| config.player.clone());

    let catalogue = Arc::new(RestCatalogue::new(&config.catalogue_url, &config.access_token));
    let store = Store::open(Path::new(&config.db_path))?;
    let content = Arc::new(ContentProvider::new(
        catalogue,
        store,
        config.cache_capacity,
        &config.device_id,
    ));

    let (player, events) = players::get_player(&backend);
    let daemon = Arc::new(Daemon::new(content, player));
    tokio::spawn(daemon.clone().autoplay(events));

    let listener = TcpListener::bind(&address).await?;
    info!("✅ Cirrus ready - listening on {}", address);

    session::serve(daemon, listener).await
}
