mod api;
mod diagnostics;
mod error;
mod models;
mod roles;
mod store;
mod trigger;
mod utils;
mod workers;

use std::{sync::Arc, time::Duration};

use api::{ApiClient, HttpTransport};
use clap::{Parser, Subcommand};
use diagnostics::TracingSink;
use futures::{stream::FuturesUnordered, StreamExt};
use models::PeerUpdate;
use store::{DashboardStore, PeerStore};
use tracing::warn;
use trigger::PeerCreationTrigger;
use workers::refresh::Refresh;

const DAY: u64 = 60 * 60 * 24;

#[derive(Debug, Parser)]
struct Config {
    #[clap(flatten)]
    api: api::Config,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ask the server to create a peer
    Create {
        /// Overlapping requests to send
        #[clap(long, short, default_value_t = 1, value_parser)]
        times: usize,
    },
    /// Create a peer with the given name
    Add {
        #[clap(value_parser)]
        name: String,
    },
    /// Rename a peer (admin only)
    Rename {
        #[clap(value_parser)]
        public_key: String,
        #[clap(value_parser)]
        name: String,
    },
    /// Move a peer's expiry to DAYS from now (admin only)
    Extend {
        #[clap(value_parser)]
        public_key: String,
        #[clap(long, short, default_value_t = 30, value_parser)]
        days: u64,
    },
    /// Show the current viewer and visible peers
    Stats,
    /// Find a peer by address, public key or name fragment
    Peer {
        #[clap(value_parser)]
        query: String,
    },
    /// Poll the dashboard and log every change
    Watch {
        #[clap(long, short, env = "REFRESH_INTERVAL", default_value_t = 1, value_parser)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    pretty_env_logger::init();

    let config = Config::parse();

    let transport = Arc::new(HttpTransport::new(config.api));

    match config.command {
        Command::Create { times } => {
            let trigger = PeerCreationTrigger::new(transport, Arc::new(TracingSink));
            let mut tasks: FuturesUnordered<_> = (0..times).map(|_| trigger.activate()).collect();
            while let Some(res) = tasks.next().await {
                if let Err(e) = res {
                    warn!("peer creation task failed: {e}");
                }
            }
        }
        Command::Add { name } => {
            let peer = ApiClient::new(transport).create_peer(&name).await?;
            println!("{}", utils::format_peer(&peer, utils::unix_now()));
        }
        Command::Rename { public_key, name } => {
            ApiClient::new(transport)
                .update_peer(&PeerUpdate::rename(&public_key, &name))
                .await?;
        }
        Command::Extend { public_key, days } => {
            let expires_at = utils::unix_now() + days * DAY;
            ApiClient::new(transport)
                .update_peer(&PeerUpdate::expire_at(&public_key, expires_at))
                .await?;
        }
        Command::Stats => {
            let client = ApiClient::new(transport);
            let dashboard = DashboardStore::default();
            let sub = dashboard.subscribe(|info| {
                tracing::info!(name = %info.name, admin = info.is_admin(), "viewer loaded");
            });

            let stats = client.stats().await?;
            dashboard.set(stats.dashboard_info());
            sub.unsubscribe();

            print!("{}", utils::format_totals(&stats));
            print!(
                "{}",
                utils::format_dashboard(&dashboard.get(), &stats.peer_book(), utils::unix_now())
            );
        }
        Command::Peer { query } => {
            let client = ApiClient::new(transport);
            let book = client.stats().await?.peer_book();
            let peer = match book.lookup(&query) {
                Some(peer) => peer.clone(),
                None => client.peer(&query).await?,
            };
            println!("{}", utils::format_peer(&peer, utils::unix_now()));
        }
        Command::Watch { interval } => {
            let dashboard = DashboardStore::default();
            let peers = PeerStore::default();
            let _viewer = dashboard.subscribe(|info| {
                tracing::info!(name = %info.name, admin = info.is_admin(), "viewer updated");
            });
            let _peers = peers.subscribe(|book| {
                tracing::info!(peers = book.len(), "peers updated");
            });

            Refresh::new(
                ApiClient::new(transport),
                dashboard,
                peers,
                Duration::from_secs(interval),
            )
            .run()
            .await;
        }
    }

    Ok(())
}
