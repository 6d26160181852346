use poolcore_core::{Tv, UserId, WorkinfoId, DEFAULT_EXPIRY};
use std::cmp::Reverse;

use crate::index::Index;

#[derive(Debug, Clone)]
pub struct ShareErrorRow {
    pub workinfoid: WorkinfoId,
    pub userid: UserId,
    pub errn: i32,
    pub error: String,
    pub createdate: Tv,
    pub expirydate: Tv,
}

// Deliberately omits `nonce` from the key, unlike `shares`: two distinct
// error submissions for the same (workinfoid, userid) in the same instant
// are treated as one coalesced error event rather than kept as separate
// rows. This mirrors upstream behavior and is intentional here, not an
// oversight.
type Key = (WorkinfoId, UserId, Tv, Reverse<Tv>);

#[derive(Default)]
pub struct ShareErrorsTable {
    slab: slab::Slab<ShareErrorRow>,
    index: Index<Key>,
}

impl ShareErrorsTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(row: &ShareErrorRow) -> Key {
        (row.workinfoid, row.userid, row.createdate, Reverse(row.expirydate))
    }

    pub fn insert(&mut self, mut row: ShareErrorRow) -> usize {
        row.expirydate = DEFAULT_EXPIRY;
        let k = Self::key(&row);
        let handle = self.slab.insert(row);
        self.index.insert(k, handle);
        handle
    }

    pub fn get(&self, handle: usize) -> Option<&ShareErrorRow> {
        self.slab.get(handle)
    }
}
