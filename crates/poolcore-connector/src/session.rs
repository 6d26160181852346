//! The client session table: one entry per accepted TCP connection, kept in
//! a process-global registry keyed by a monotonic id assigned at accept time.

use std::collections::HashMap;
use std::net::{SocketAddr, TcpStream};
use std::sync::RwLock;

use poolcore_core::PAGESIZE;

/// One accepted miner connection.
///
/// `fd == -1` (tracked via `stream: None`) marks an invalidated session: the
/// socket has been closed but the entry is left in the table so that `id`
/// remains stable for the life of the process, exactly as the acceptance
/// order requires.
pub struct ClientSession {
    pub id: i64,
    pub addr: SocketAddr,
    pub stream: Option<TcpStream>,
    /// Bytes received but not yet resolved into a complete line.
    pub buf: Vec<u8>,
}

impl ClientSession {
    fn new(id: i64, addr: SocketAddr, stream: TcpStream) -> Self {
        Self {
            id,
            addr,
            stream: Some(stream),
            buf: Vec::with_capacity(PAGESIZE),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.stream.is_some()
    }
}

/// The hashtable of all sessions, plus the next id to hand out. One
/// reader-writer lock guards both, as the connector's concurrency model
/// requires: the acceptor takes it briefly to register a new session, the
/// receiver takes a read lock to snapshot pollable fds and a write lock only
/// when invalidating one, and the control loop takes a read lock to look up
/// a session by id.
#[derive(Default)]
pub struct SessionTable {
    sessions: HashMap<i64, ClientSession>,
    next_id: i64,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection and returns its assigned id.
    pub fn insert(&mut self, addr: SocketAddr, stream: TcpStream) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.sessions.insert(id, ClientSession::new(id, addr, stream));
        id
    }

    pub fn get(&self, id: i64) -> Option<&ClientSession> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut ClientSession> {
        self.sessions.get_mut(&id)
    }

    /// File descriptors of every still-valid session, for building a poll set.
    pub fn valid_fds(&self) -> Vec<(i64, std::os::unix::io::RawFd)> {
        use std::os::unix::io::AsRawFd;
        self.sessions
            .values()
            .filter_map(|s| s.stream.as_ref().map(|st| (s.id, st.as_raw_fd())))
            .collect()
    }

    /// Closes the session's socket and marks it invalid. Idempotent.
    pub fn invalidate(&mut self, id: i64) {
        if let Some(session) = self.sessions.get_mut(&id) {
            session.stream = None;
            session.buf.clear();
        }
    }

    /// Removes invalidated sessions from the table, keeping ids for the
    /// `keep_recent` most recently invalidated ones so id-adjacent lookups
    /// made shortly after a drop still resolve. Bounds the table's growth
    /// under a steady churn of short-lived connections; `next_id` is never
    /// reused regardless of how many entries are reaped.
    pub fn reap(&mut self, keep_recent: usize) {
        let mut invalid_ids: Vec<i64> = self
            .sessions
            .iter()
            .filter(|(_, s)| !s.is_valid())
            .map(|(id, _)| *id)
            .collect();
        if invalid_ids.len() <= keep_recent {
            return;
        }
        invalid_ids.sort_unstable();
        let drop_count = invalid_ids.len() - keep_recent;
        for id in &invalid_ids[..drop_count] {
            self.sessions.remove(id);
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Shared, lockable handle to the session table.
pub type SharedSessions = RwLock<SessionTable>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{TcpListener, TcpStream};

    fn loopback_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn assigns_monotonic_ids() {
        let mut table = SessionTable::new();
        let (_c1, s1) = loopback_pair();
        let (_c2, s2) = loopback_pair();
        let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let id1 = table.insert(addr, s1);
        let id2 = table.insert(addr, s2);
        assert_eq!(id1, 0);
        assert_eq!(id2, 1);
    }

    #[test]
    fn invalidate_then_reap_respects_keep_recent() {
        let mut table = SessionTable::new();
        let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
        for _ in 0..3 {
            let (_c, s) = loopback_pair();
            table.insert(addr, s);
        }
        table.invalidate(0);
        table.invalidate(1);
        table.invalidate(2);
        table.reap(1);
        assert_eq!(table.len(), 1);
        assert!(table.get(2).is_some());
    }
}
