//! Waits on the readable set of client sockets and parses complete JSON
//! lines out of whichever ones have data, using `libc::poll` directly since
//! this subsystem runs no cooperative scheduler.

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::framing::{next_frame, FrameResult};
use crate::link::StratifierLink;
use crate::session::SharedSessions;

const POLL_TIMEOUT_MS: i32 = 1000;
const IDLE_SLEEP: Duration = Duration::from_millis(100);
/// How many recently invalidated sessions to retain in the table for
/// id-stability after a `dropclient` notification.
const REAP_KEEP_RECENT: usize = 64;

/// Runs forever, polling the current set of valid session sockets and
/// dispatching readable ones to [`handle_readable`].
pub fn run(sessions: Arc<SharedSessions>, link: Arc<dyn StratifierLink>) {
    loop {
        let fds = sessions.read().unwrap().valid_fds();
        if fds.is_empty() {
            std::thread::sleep(IDLE_SLEEP);
            continue;
        }

        let mut pollfds: Vec<libc::pollfd> = fds
            .iter()
            .map(|(_, fd)| libc::pollfd { fd: *fd, events: libc::POLLIN, revents: 0 })
            .collect();

        // SAFETY: `pollfds` is a valid, exclusively-owned buffer of the
        // length passed; `poll(2)` only reads `fd`/`events` and writes
        // `revents` within that buffer.
        let ret = unsafe { libc::poll(pollfds.as_mut_ptr(), pollfds.len() as libc::nfds_t, POLL_TIMEOUT_MS) };

        if ret < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            tracing::error!(error = %err, "receiver failed to poll, exiting");
            return;
        }
        if ret == 0 {
            continue;
        }

        let mut remaining = ret;
        for (pfd, (id, _fd)) in pollfds.iter().zip(fds.iter()) {
            if remaining < 1 {
                break;
            }
            if pfd.revents & libc::POLLIN != 0 {
                handle_readable(*id, &sessions, link.as_ref());
                remaining -= 1;
            } else if pfd.revents & (libc::POLLHUP | libc::POLLERR) != 0 {
                invalidate(*id, &sessions, link.as_ref());
                remaining -= 1;
            }
        }

        sessions.write().unwrap().reap(REAP_KEEP_RECENT);
    }
}

fn handle_readable(id: i64, sessions: &SharedSessions, link: &dyn StratifierLink) {
    loop {
        let mut chunk = vec![0u8; poolcore_core::PAGESIZE];
        let read_result = {
            let mut guard = sessions.write().unwrap();
            match guard.get_mut(id) {
                Some(session) if session.is_valid() => session.stream.as_mut().unwrap().read(&mut chunk),
                _ => return,
            }
        };

        match read_result {
            Ok(0) => {
                info!(client_id = id, "client disconnected");
                invalidate(id, sessions, link);
                return;
            }
            Ok(n) => {
                let filled_buffer = n == chunk.len();
                {
                    let mut guard = sessions.write().unwrap();
                    if let Some(session) = guard.get_mut(id) {
                        session.buf.extend_from_slice(&chunk[..n]);
                    }
                }
                if !drain_lines(id, sessions, link) {
                    return;
                }
                if !filled_buffer {
                    return;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(_) => {
                invalidate(id, sessions, link);
                return;
            }
        }
    }
}

/// Extracts and dispatches every complete line currently buffered for
/// `id`. Returns `false` if the session was invalidated along the way.
fn drain_lines(id: i64, sessions: &SharedSessions, link: &dyn StratifierLink) -> bool {
    loop {
        let frame = {
            let mut guard = sessions.write().unwrap();
            match guard.get_mut(id) {
                Some(session) => next_frame(&mut session.buf),
                None => return false,
            }
        };

        match frame {
            FrameResult::NeedMore => return true,
            FrameResult::Overflow => {
                warn!(client_id = id, "client overloaded buffer without EOL, disconnecting");
                invalidate(id, sessions, link);
                return false;
            }
            FrameResult::Line(bytes) => {
                if !handle_line(id, &bytes, sessions, link) {
                    return false;
                }
            }
        }
    }
}

fn handle_line(id: i64, bytes: &[u8], sessions: &SharedSessions, link: &dyn StratifierLink) -> bool {
    let mut value: Value = match serde_json::from_slice(bytes) {
        Ok(v) => v,
        Err(_) => {
            info!(client_id = id, "sent invalid json message, disconnecting");
            write_to_client(id, sessions, b"Invalid JSON, disconnecting\n");
            invalidate(id, sessions, link);
            return false;
        }
    };

    if let Value::Object(ref mut map) = value {
        map.insert("client_id".to_string(), Value::from(id));
    } else {
        warn!(client_id = id, "message is not a JSON object, forwarding without client_id");
    }

    match serde_json::to_string(&value) {
        Ok(line) => link.forward(line),
        Err(e) => tracing::error!(client_id = id, error = %e, "failed to re-serialize client message"),
    }
    true
}

fn write_to_client(id: i64, sessions: &SharedSessions, bytes: &[u8]) {
    let mut guard = sessions.write().unwrap();
    if let Some(session) = guard.get_mut(id) {
        if let Some(stream) = session.stream.as_mut() {
            let _ = stream.write_all(bytes);
        }
    }
}

fn invalidate(id: i64, sessions: &SharedSessions, link: &dyn StratifierLink) {
    sessions.write().unwrap().invalidate(id);
    link.drop_client(id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::ChannelStratifierLink;
    use crate::session::SessionTable;
    use std::net::{TcpListener, TcpStream};
    use std::sync::RwLock;

    fn loopback_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        server.set_nonblocking(true).unwrap();
        (client, server)
    }

    #[test]
    fn forwards_complete_line_with_client_id() {
        let (mut client, server) = loopback_pair();
        let addr = server.local_addr().unwrap();
        let mut table = SessionTable::new();
        let id = table.insert(addr, server);
        let sessions: Arc<SharedSessions> = Arc::new(RwLock::new(table));
        let (link, rx) = ChannelStratifierLink::new();

        client.write_all(b"{\"method\":\"subscribe\"}\n").unwrap();
        std::thread::sleep(Duration::from_millis(50));

        handle_readable(id, &sessions, &link);

        let msg = rx.try_recv().unwrap();
        match msg {
            crate::link::StratifierMessage::Forward(s) => {
                let v: Value = serde_json::from_str(&s).unwrap();
                assert_eq!(v["client_id"], Value::from(id));
                assert_eq!(v["method"], "subscribe");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn oversize_line_without_newline_invalidates_and_drops() {
        let (mut client, server) = loopback_pair();
        let addr = server.local_addr().unwrap();
        let mut table = SessionTable::new();
        let id = table.insert(addr, server);
        let sessions: Arc<SharedSessions> = Arc::new(RwLock::new(table));
        let (link, rx) = ChannelStratifierLink::new();

        let oversize = vec![b'x'; 1200];
        client.write_all(&oversize).unwrap();
        std::thread::sleep(Duration::from_millis(50));

        handle_readable(id, &sessions, &link);

        assert!(!sessions.read().unwrap().get(id).unwrap().is_valid());
        assert_eq!(rx.try_recv().unwrap(), crate::link::StratifierMessage::DropClient(id));
    }
}
