use poolcore_core::{Tv, UserId, DEFAULT_EXPIRY};
use std::cmp::Reverse;

use crate::index::Index;

#[derive(Debug, Clone)]
pub struct WorkerRow {
    pub userid: UserId,
    pub workername: String,
    pub difficultydefault: i32,
    pub idlenotificationenabled: bool,
    pub createdate: Tv,
    pub expirydate: Tv,
}

type Key = (UserId, String, Reverse<Tv>);

#[derive(Default)]
pub struct WorkersTable {
    slab: slab::Slab<WorkerRow>,
    by_userid_workername: Index<Key>,
}

impl WorkersTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(row: &WorkerRow) -> Key {
        (row.userid, row.workername.clone(), Reverse(row.expirydate))
    }

    pub fn insert(&mut self, mut row: WorkerRow) -> usize {
        row.expirydate = DEFAULT_EXPIRY;
        let k = Self::key(&row);
        let handle = self.slab.insert(row);
        self.by_userid_workername.insert(k, handle);
        handle
    }

    /// Supersedes the current row for `(userid, workername)` — used when
    /// a worker's difficulty or idle-notification setting changes.
    pub fn supersede(&mut self, userid: UserId, workername: &str, now: Tv, new_row: WorkerRow) -> usize {
        if let Some(handle) = self.find_current(userid, workername) {
            let old_key = Self::key(&self.slab[handle]);
            self.by_userid_workername.remove(&old_key, handle);
            self.slab[handle].expirydate = now;
            let key = Self::key(&self.slab[handle]);
            self.by_userid_workername.insert(key, handle);
        }
        self.insert(new_row)
    }

    pub fn get(&self, handle: usize) -> Option<&WorkerRow> {
        self.slab.get(handle)
    }

    pub fn find_current(&self, userid: UserId, workername: &str) -> Option<usize> {
        self.by_userid_workername
            .find(&(userid, workername.to_string(), Reverse(DEFAULT_EXPIRY)))
    }
}
