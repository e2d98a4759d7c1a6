use std::fmt::Write;

use crate::models::{DashboardInfo, Peer, PeerBook, StatsSnapshot};

fn fmt_gb(bytes: u64) -> String {
    format!("{:.3}", bytes as f64 / 1024.0 / 1024.0 / 1024.0)
}

pub fn format_peer(peer: &Peer, now: u64) -> String {
    format!(
        "{name} ({address}) ↑{tx} GB ↓{rx} GB, used {used}/{allowed} GB, {left} GB left{expired}",
        name = if peer.name.is_empty() { "<unnamed>" } else { peer.name.as_str() },
        address = peer.address,
        tx = fmt_gb(peer.current_tx),
        rx = fmt_gb(peer.current_rx),
        used = fmt_gb(peer.total_usage),
        allowed = fmt_gb(peer.allowed_usage),
        left = fmt_gb(peer.remaining_usage()),
        expired = if peer.is_expired(now) { ", expired" } else { "" },
    )
}

pub fn format_dashboard(info: &DashboardInfo, peers: &PeerBook, now: u64) -> String {
    let mut res = format!("{name} [{role}]\nPeers:\n", name = info.name, role = info.role);
    if peers.is_empty() {
        res.push_str("\t<none>\n");
    }
    for peer in peers.iter() {
        let _ = writeln!(res, "\t{}", format_peer(peer, now));
    }
    res
}

pub fn format_totals(stats: &StatsSnapshot) -> String {
    format!(
        "Total ↑{total_tx} GB ↓{total_rx} GB, now ↑{current_tx} GB ↓{current_rx} GB\n",
        total_tx = fmt_gb(stats.total_tx),
        total_rx = fmt_gb(stats.total_rx),
        current_tx = fmt_gb(stats.current_tx),
        current_rx = fmt_gb(stats.current_rx),
    )
}

pub fn unix_now() -> u64 {
    time::OffsetDateTime::now_utc()
        .unix_timestamp()
        .try_into()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_line() {
        let peer = Peer {
            name: "alice-phone".to_owned(),
            address: "10.0.0.2/32".to_owned(),
            current_tx: 1024 * 1024 * 1024,
            allowed_usage: 2 * 1024 * 1024 * 1024,
            expires_at: 10,
            ..Default::default()
        };

        assert_eq!(
            format_peer(&peer, 5),
            "alice-phone (10.0.0.2/32) ↑1.000 GB ↓0.000 GB, used 0.000/2.000 GB, 2.000 GB left"
        );
        assert!(format_peer(&peer, 11).ends_with(", expired"));
    }

    #[test]
    fn dashboard_lists_every_peer() {
        let peers: PeerBook = vec![
            Peer {
                public_key: "k1".to_owned(),
                ..Default::default()
            },
            Peer {
                public_key: "k2".to_owned(),
                name: "bob".to_owned(),
                ..Default::default()
            },
        ]
        .into_iter()
        .collect();
        let info = DashboardInfo {
            name: "alice".to_owned(),
            role: "admin".to_owned(),
        };

        let out = format_dashboard(&info, &peers, 0);
        assert!(out.starts_with("alice [admin]\n"));
        assert!(out.contains("\t<unnamed>"));
        assert!(out.contains("\tbob"));
        assert!(!out.contains("<none>"));

        let out = format_dashboard(&info, &PeerBook::new(), 0);
        assert_eq!(out, "alice [admin]\nPeers:\n\t<none>\n");
    }

    #[test]
    fn totals_line() {
        let stats = StatsSnapshot {
            total_rx: 3 * 1024 * 1024 * 1024,
            current_tx: 512 * 1024 * 1024,
            ..Default::default()
        };

        assert_eq!(
            format_totals(&stats),
            "Total ↑0.000 GB ↓3.000 GB, now ↑0.500 GB ↓0.000 GB\n"
        );
    }
}
