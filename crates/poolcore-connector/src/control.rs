//! The local control channel: a Unix domain stream socket that accepts one
//! message per connection and either routes it to a client or shuts the
//! connector down. This is the nearest portable equivalent of the original
//! process-supervision control socket.

use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::session::SharedSessions;

/// Runs the control loop until a `shutdown` message is received or the
/// listener errors out irrecoverably.
pub fn run(listener: UnixListener, sessions: Arc<SharedSessions>) {
    loop {
        let mut conn = match listener.accept() {
            Ok((conn, _addr)) => conn,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::error!(error = %e, "control loop failed to accept, exiting");
                return;
            }
        };

        let buf = match read_message(&mut conn) {
            Some(buf) => buf,
            None => {
                warn!("failed to read message on control channel");
                continue;
            }
        };

        if buf.trim_start().to_ascii_lowercase().starts_with("shutdown") {
            info!("control channel received shutdown, exiting control loop");
            return;
        }

        route_message(&buf, &sessions);
    }
}

fn read_message(conn: &mut UnixStream) -> Option<String> {
    let mut buf = Vec::new();
    conn.read_to_end(&mut buf).ok()?;
    String::from_utf8(buf).ok()
}

/// Parses `raw` as JSON, strips its mandatory `client_id` field, appends a
/// trailing newline to the remainder, and writes it to that client's
/// socket. Malformed or unaddressable messages are logged and dropped.
fn route_message(raw: &str, sessions: &SharedSessions) {
    let mut value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "invalid json message on control channel");
            return;
        }
    };

    let client_id = match value.get("client_id").and_then(Value::as_i64) {
        Some(id) => id,
        None => {
            warn!("control channel message missing client_id");
            return;
        }
    };

    if let Value::Object(ref mut map) = value {
        map.remove("client_id");
    }

    let mut payload = match serde_json::to_string(&value) {
        Ok(s) => s,
        Err(e) => {
            warn!(client_id, error = %e, "failed to re-serialize control channel message");
            return;
        }
    };
    payload.push('\n');

    let mut guard = sessions.write().unwrap();
    match guard.get_mut(client_id) {
        Some(session) if session.is_valid() => {
            if let Err(e) = session.stream.as_mut().unwrap().write_all(payload.as_bytes()) {
                warn!(client_id, error = %e, "client disconnected while routing control message");
                drop(guard);
                sessions.write().unwrap().invalidate(client_id);
            }
        }
        Some(_) => warn!(client_id, "client disconnected"),
        None => warn!(client_id, "failed to find client in session table"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionTable;
    use std::net::{TcpListener, TcpStream};
    use std::sync::RwLock;

    fn loopback_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn routes_message_to_correct_client_and_strips_client_id() {
        let (mut client, server) = loopback_pair();
        let addr = server.local_addr().unwrap();
        let mut table = SessionTable::new();
        let id = table.insert(addr, server);
        let sessions = RwLock::new(table);

        route_message(&format!("{{\"client_id\":{id},\"result\":true}}"), &sessions);

        let mut out = [0u8; 64];
        client.set_read_timeout(Some(std::time::Duration::from_millis(200))).unwrap();
        let n = client.read(&mut out).unwrap();
        let received = String::from_utf8_lossy(&out[..n]);
        assert!(received.ends_with('\n'));
        let v: Value = serde_json::from_str(received.trim_end()).unwrap();
        assert!(v.get("client_id").is_none());
        assert_eq!(v["result"], true);
    }

    #[test]
    fn unknown_client_id_is_dropped_without_panicking() {
        let sessions = RwLock::new(SessionTable::new());
        route_message("{\"client_id\":999,\"result\":true}", &sessions);
    }
}
