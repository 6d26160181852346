//! poolcore-pool — the pool backend binary.
//!
//! Startup sequence:
//!   1. Initialise the tracing subscriber
//!   2. Build the in-memory accounting store
//!   3. Wire a stratifier hand-off (a channel-backed stub in this binary;
//!      a real deployment supplies its own `StratifierLink`)
//!   4. Bind the miner-facing listener and the control socket, spawn the
//!      acceptor/receiver/control threads
//!   5. Block until the control loop receives `shutdown`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use poolcore_connector::{spawn, ChannelStratifierLink, ConnectorConfig, StratifierMessage};
use poolcore_store::Store;

#[derive(Parser, Debug)]
#[command(
    name = "poolcore-pool",
    version,
    about = "Mining pool backend: TCP client connector + in-memory accounting store"
)]
struct Args {
    /// `host:port` for the miner-facing TCP listener. Defaults to all
    /// interfaces on the pool's default port when unset.
    #[arg(long)]
    listen_addr: Option<String>,

    /// Unix domain socket path for the local stratifier control channel.
    #[arg(long, default_value = "/tmp/poolcore-control.sock")]
    control_socket: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,poolcore=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("poolcore-pool starting");

    // ── Accounting store ────────────────────────────────────────────────
    let store = Arc::new(Store::new());

    // ── Stratifier hand-off ─────────────────────────────────────────────
    // This binary has no real stratifier process to bridge to (out of
    // scope, per the pool backend's own external-interfaces boundary); the
    // channel-backed link lets the connector run standalone while logging
    // what it would have forwarded.
    let (link, inbound) = ChannelStratifierLink::new();
    let store_for_drain = Arc::clone(&store);
    std::thread::Builder::new()
        .name("stratifier-stub".into())
        .spawn(move || drain_stratifier_messages(inbound, store_for_drain))
        .context("spawning stratifier stub thread")?;

    // ── Connector ────────────────────────────────────────────────────────
    let config = ConnectorConfig {
        listen_addr: args.listen_addr.clone(),
        control_socket_path: args.control_socket.clone(),
    };
    let handle = spawn(config, Arc::new(link)).context("spawning connector")?;
    info!(
        sessions = handle.sessions.read().unwrap().len(),
        control_socket = %args.control_socket.display(),
        "connector running"
    );

    handle.wait_for_shutdown();
    info!("poolcore-pool exiting");
    Ok(())
}

/// Placeholder consumer of the messages the connector would otherwise send
/// to an external stratifier process. Logs what arrives; a real deployment
/// replaces `ChannelStratifierLink` with a `StratifierLink` that bridges to
/// that process's actual IPC channel instead of running this thread at all.
fn drain_stratifier_messages(
    inbound: std::sync::mpsc::Receiver<StratifierMessage>,
    _store: Arc<Store>,
) {
    for msg in inbound {
        match msg {
            StratifierMessage::Forward(line) => info!(%line, "stratifier stub received message"),
            StratifierMessage::DropClient(id) => warn!(client_id = id, "stratifier stub notified of dropped client"),
        }
    }
}
