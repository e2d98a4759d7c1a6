use std::time::Duration;

use crate::{
    api::ApiClient,
    error::ClientError,
    store::{DashboardStore, PeerStore},
};

/// Keeps the dashboard stores in sync with `/api/stats`.
pub struct Refresh {
    client: ApiClient,
    dashboard: DashboardStore,
    peers: PeerStore,
    interval: Duration,
}

impl Refresh {
    pub fn new(
        client: ApiClient,
        dashboard: DashboardStore,
        peers: PeerStore,
        interval: Duration,
    ) -> Self {
        Self {
            client,
            dashboard,
            peers,
            interval,
        }
    }

    /// On failure the stores keep their previous values.
    pub async fn tick(&self) -> Result<(), ClientError> {
        let stats = self.client.stats().await?;
        self.dashboard.set(stats.dashboard_info());
        self.peers.set(stats.peer_book());
        Ok(())
    }

    pub async fn run(self) {
        loop {
            if let Err(e) = self.tick().await {
                tracing::warn!("dashboard refresh failed: {e}");
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}
