//! Accepts incoming TCP connections and registers a session for each.

use std::net::TcpListener;
use std::sync::Arc;

use socket2::SockRef;
use tracing::{info, warn};

use crate::session::SharedSessions;

/// Blocks accepting connections on `listener` until it errors out (the
/// listener is never closed while the process runs, so in practice this
/// only returns on an unrecoverable accept error).
pub fn run(listener: TcpListener, sessions: Arc<SharedSessions>) {
    loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                if let Err(e) = stream.set_nodelay(true) {
                    warn!(%addr, error = %e, "failed to set TCP_NODELAY on new client");
                }
                if let Err(e) = SockRef::from(&stream).set_keepalive(true) {
                    warn!(%addr, error = %e, "failed to set SO_KEEPALIVE on new client");
                }
                if let Err(e) = stream.set_nonblocking(true) {
                    warn!(%addr, error = %e, "failed to set client socket non-blocking, dropping");
                    continue;
                }
                let id = sessions.write().unwrap().insert(addr, stream);
                info!(client_id = id, %addr, "connected new client");
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::error!(error = %e, "acceptor failed to accept, exiting");
                return;
            }
        }
    }
}
