//! Top-level wiring: binds the miner-facing listener and the control
//! socket, then spawns the acceptor, receiver and control threads.

use std::net::TcpListener;
use std::os::unix::net::UnixListener;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use poolcore_core::{BIND_RETRY_ATTEMPTS, BIND_RETRY_DELAY_SECS, DEFAULT_LISTEN_PORT};
use tracing::warn;

use crate::link::StratifierLink;
use crate::session::{SessionTable, SharedSessions};
use crate::{acceptor, control, receiver};

/// Configuration needed to stand up a connector instance.
pub struct ConnectorConfig {
    /// `host:port` to bind the miner-facing listener to. `None` binds
    /// `0.0.0.0:<DEFAULT_LISTEN_PORT>`.
    pub listen_addr: Option<String>,
    /// Path for the local control-channel Unix domain socket. Any existing
    /// socket file at this path is removed before binding.
    pub control_socket_path: PathBuf,
}

/// The three running connector threads plus the session table they share.
pub struct ConnectorHandle {
    pub sessions: Arc<SharedSessions>,
    pub acceptor: JoinHandle<()>,
    pub receiver: JoinHandle<()>,
    pub control: JoinHandle<()>,
}

impl ConnectorHandle {
    /// Blocks until the control thread exits (normally via a `shutdown`
    /// message). The acceptor and receiver threads have no independent
    /// cancellation signal and are left running; the process exiting is
    /// what actually stops them.
    pub fn wait_for_shutdown(self) {
        let _ = self.control.join();
    }
}

/// Binds `addr`, retrying every [`BIND_RETRY_DELAY_SECS`] seconds up to
/// [`BIND_RETRY_ATTEMPTS`] times before giving up.
fn bind_with_retry(addr: &str) -> std::io::Result<TcpListener> {
    let mut last_err = None;
    for attempt in 0..BIND_RETRY_ATTEMPTS {
        match TcpListener::bind(addr) {
            Ok(listener) => {
                if attempt > 0 {
                    warn!(attempt, "connector successfully bound to socket");
                }
                return Ok(listener);
            }
            Err(e) => {
                warn!(attempt, error = %e, "connector failed to bind to socket, retrying");
                last_err = Some(e);
                std::thread::sleep(Duration::from_secs(BIND_RETRY_DELAY_SECS));
            }
        }
    }
    Err(last_err.unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "bind retries exhausted")))
}

/// Binds both sockets and spawns the acceptor, receiver and control
/// threads. The returned handle owns the session table all three share.
pub fn spawn(config: ConnectorConfig, link: Arc<dyn StratifierLink>) -> std::io::Result<ConnectorHandle> {
    let listen_addr = config
        .listen_addr
        .unwrap_or_else(|| format!("0.0.0.0:{DEFAULT_LISTEN_PORT}"));
    let tcp_listener = bind_with_retry(&listen_addr)?;

    if config.control_socket_path.exists() {
        std::fs::remove_file(&config.control_socket_path)?;
    }
    let control_listener = UnixListener::bind(&config.control_socket_path)?;

    let sessions: Arc<SharedSessions> = Arc::new(SharedSessions::new(SessionTable::new()));

    let acceptor_sessions = sessions.clone();
    let acceptor_handle = std::thread::Builder::new()
        .name("acceptor".into())
        .spawn(move || acceptor::run(tcp_listener, acceptor_sessions))
        .expect("failed to spawn acceptor thread");

    let receiver_sessions = sessions.clone();
    let receiver_link = link.clone();
    let receiver_handle = std::thread::Builder::new()
        .name("receiver".into())
        .spawn(move || receiver::run(receiver_sessions, receiver_link))
        .expect("failed to spawn receiver thread");

    let control_sessions = sessions.clone();
    let control_handle = std::thread::Builder::new()
        .name("control".into())
        .spawn(move || control::run(control_listener, control_sessions))
        .expect("failed to spawn control thread");

    Ok(ConnectorHandle {
        sessions,
        acceptor: acceptor_handle,
        receiver: receiver_handle,
        control: control_handle,
    })
}
