use poolcore_core::{AuthId, Tv, UserId, DEFAULT_EXPIRY};
use std::cmp::Reverse;

use crate::index::Index;

#[derive(Debug, Clone)]
pub struct AuthRow {
    pub userid: UserId,
    pub authid: AuthId,
    pub workername: String,
    pub createdate: Tv,
    pub expirydate: Tv,
}

type Key = (UserId, Tv, AuthId, Reverse<Tv>);

#[derive(Default)]
pub struct AuthsTable {
    slab: slab::Slab<AuthRow>,
    index: Index<Key>,
}

impl AuthsTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(row: &AuthRow) -> Key {
        (row.userid, row.createdate, row.authid, Reverse(row.expirydate))
    }

    pub fn insert(&mut self, mut row: AuthRow) -> usize {
        row.expirydate = DEFAULT_EXPIRY;
        let k = Self::key(&row);
        let handle = self.slab.insert(row);
        self.index.insert(k, handle);
        handle
    }

    pub fn get(&self, handle: usize) -> Option<&AuthRow> {
        self.slab.get(handle)
    }
}
