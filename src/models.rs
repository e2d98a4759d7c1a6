use std::{
    collections::{BTreeMap, HashMap},
    net::IpAddr,
};

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::{error::KeyError, roles};

/// The signed-in viewer of the dashboard.
///
/// `Default` is the bootstrap placeholder held before the first refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardInfo {
    pub name: String,
    pub role: String,
}

impl DashboardInfo {
    pub fn is_admin(&self) -> bool {
        self.role == roles::ADMIN
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Peer {
    pub name: String,
    pub latest_handshake: u64,
    pub address: String,
    pub expires_at: u64,
    pub current_rx: u64,
    pub current_tx: u64,
    pub allowed_usage: u64,
    pub total_usage: u64,
    pub public_key: String,
    pub role: String,
    pub telegram_token: String,
}

impl Peer {
    pub fn remaining_usage(&self) -> u64 {
        self.allowed_usage.saturating_sub(self.total_usage)
    }

    /// `now` is in unix seconds.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at < now
    }

    /// Addresses in `address`, which may hold several comma-separated `ip[/prefix]` entries.
    /// Entries that fail to parse are skipped.
    pub fn ips(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.address
            .split(',')
            .filter_map(|entry| entry.trim().split('/').next())
            .filter_map(|ip| ip.parse().ok())
    }

    pub fn key_bytes(&self) -> Result<[u8; 32], KeyError> {
        let raw = STANDARD.decode(self.public_key.trim())?;
        let len = raw.len();
        raw.try_into().map_err(|_| KeyError::Length(len))
    }
}

/// Body of the admin `POST /api/peers` call.
///
/// The server renames the peer when `name` is set and differs from the current
/// name; otherwise it sets the expiry to `expires_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerUpdate {
    pub public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl PeerUpdate {
    pub fn rename(public_key: &str, name: &str) -> Self {
        Self {
            public_key: public_key.to_owned(),
            name: Some(name.to_owned()),
            expires_at: None,
        }
    }

    pub fn expire_at(public_key: &str, expires_at: u64) -> Self {
        Self {
            public_key: public_key.to_owned(),
            name: None,
            expires_at: Some(expires_at),
        }
    }
}

/// Peers keyed by public key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerBook {
    peers: BTreeMap<String, Peer>,
}

impl PeerBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the replaced peer if one with the same key was present.
    pub fn insert(&mut self, peer: Peer) -> Option<Peer> {
        if let Err(e) = peer.key_bytes() {
            tracing::warn!(public_key = %peer.public_key, "peer key is not a wireguard key: {e}");
        }
        self.peers.insert(peer.public_key.clone(), peer)
    }

    pub fn get(&self, public_key: &str) -> Option<&Peer> {
        self.peers.get(public_key)
    }

    pub fn find_by_name(&self, fragment: &str) -> Option<&Peer> {
        self.peers.values().find(|p| p.name.contains(fragment))
    }

    pub fn find_by_address(&self, ip: IpAddr) -> Option<&Peer> {
        self.peers.values().find(|p| p.ips().any(|a| a == ip))
    }

    /// An IP matches by address; anything else by public key, then by name fragment.
    pub fn lookup(&self, query: &str) -> Option<&Peer> {
        match query.parse::<IpAddr>() {
            Ok(ip) => self.find_by_address(ip),
            Err(_) => self.get(query).or_else(|| self.find_by_name(query)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl FromIterator<Peer> for PeerBook {
    fn from_iter<I: IntoIterator<Item = Peer>>(iter: I) -> Self {
        let mut book = Self::new();
        for peer in iter {
            book.insert(peer);
        }
        book
    }
}

/// Payload of `GET /api/stats`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsSnapshot {
    pub name: String,
    pub is_admin: bool,
    pub role: Option<String>,
    pub peers: HashMap<String, Peer>,
    pub total_rx: u64,
    pub total_tx: u64,
    pub current_rx: u64,
    pub current_tx: u64,
}

impl StatsSnapshot {
    pub fn dashboard_info(&self) -> DashboardInfo {
        DashboardInfo {
            name: self.name.clone(),
            role: self
                .role
                .clone()
                .unwrap_or_else(|| roles::from_admin_flag(self.is_admin).to_owned()),
        }
    }

    /// Map keys win over an empty `publicKey` inside the record.
    pub fn peer_book(&self) -> PeerBook {
        self.peers
            .iter()
            .map(|(key, peer)| {
                let mut peer = peer.clone();
                if peer.public_key.is_empty() {
                    peer.public_key = key.clone();
                }
                peer
            })
            .collect()
    }
}
