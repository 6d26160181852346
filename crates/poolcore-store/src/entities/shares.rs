use poolcore_core::{Tv, UserId, WorkinfoId, DEFAULT_EXPIRY};
use std::cmp::Reverse;

use crate::index::Index;

#[derive(Debug, Clone)]
pub struct ShareRow {
    pub workinfoid: WorkinfoId,
    pub userid: UserId,
    pub workername: String,
    pub nonce: String,
    pub diff: f64,
    pub sdiff: f64,
    pub createdate: Tv,
    pub expirydate: Tv,
}

type Key = (WorkinfoId, UserId, String, Tv, String, Reverse<Tv>);

#[derive(Default)]
pub struct SharesTable {
    slab: slab::Slab<ShareRow>,
    index: Index<Key>,
}

impl SharesTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(row: &ShareRow) -> Key {
        (
            row.workinfoid,
            row.userid,
            row.workername.clone(),
            row.createdate,
            row.nonce.clone(),
            Reverse(row.expirydate),
        )
    }

    pub fn insert(&mut self, mut row: ShareRow) -> usize {
        row.expirydate = DEFAULT_EXPIRY;
        let k = Self::key(&row);
        let handle = self.slab.insert(row);
        self.index.insert(k, handle);
        handle
    }

    pub fn get(&self, handle: usize) -> Option<&ShareRow> {
        self.slab.get(handle)
    }

    /// All shares recorded for `workinfoid`, in key order.
    pub fn for_workinfo(&self, workinfoid: WorkinfoId) -> Vec<usize> {
        let mut out = Vec::new();
        let probe = (workinfoid, UserId::MIN, String::new(), Tv::epoch(), String::new(), Reverse(DEFAULT_EXPIRY));
        let mut cursor = self.index.find_after(&probe);
        while let Some((key, handle)) = cursor {
            if key.0 != workinfoid {
                break;
            }
            out.push(handle);
            cursor = self.index.next_after(&key, handle);
        }
        out
    }
}
