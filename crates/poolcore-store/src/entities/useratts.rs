use poolcore_core::{Tv, UserId, DEFAULT_EXPIRY};
use std::cmp::Reverse;

use crate::index::Index;

#[derive(Debug, Clone)]
pub struct UserAttRow {
    pub userid: UserId,
    pub attname: String,
    pub attstr: String,
    pub createdate: Tv,
    pub expirydate: Tv,
}

type Key = (UserId, String, Reverse<Tv>);

#[derive(Default)]
pub struct UserAttsTable {
    slab: slab::Slab<UserAttRow>,
    by_userid_attname: Index<Key>,
}

impl UserAttsTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(row: &UserAttRow) -> Key {
        (row.userid, row.attname.clone(), Reverse(row.expirydate))
    }

    pub fn insert(&mut self, mut row: UserAttRow) -> usize {
        row.expirydate = DEFAULT_EXPIRY;
        let k = Self::key(&row);
        let handle = self.slab.insert(row);
        self.by_userid_attname.insert(k, handle);
        handle
    }

    pub fn supersede(&mut self, userid: UserId, attname: &str, now: Tv, new_row: UserAttRow) -> usize {
        if let Some(handle) = self.find_current(userid, attname) {
            let old_key = Self::key(&self.slab[handle]);
            self.by_userid_attname.remove(&old_key, handle);
            self.slab[handle].expirydate = now;
            let key = Self::key(&self.slab[handle]);
            self.by_userid_attname.insert(key, handle);
        }
        self.insert(new_row)
    }

    pub fn get(&self, handle: usize) -> Option<&UserAttRow> {
        self.slab.get(handle)
    }

    pub fn find_current(&self, userid: UserId, attname: &str) -> Option<usize> {
        self.by_userid_attname.find(&(userid, attname.to_string(), Reverse(DEFAULT_EXPIRY)))
    }
}
