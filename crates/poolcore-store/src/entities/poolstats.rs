use poolcore_core::Tv;

use crate::index::Index;

/// Periodic pool-wide hashrate snapshots. Append-only: no supersede, no
/// expirydate.
#[derive(Debug, Clone)]
pub struct PoolStatsRow {
    pub poolinstance: String,
    pub createdate: Tv,
    pub elapsed: i64,
    pub hashrate: f64,
    pub hashrate5m: f64,
    pub hashrate1hr: f64,
    pub hashrate24hr: f64,
    pub users: i32,
    pub workers: i32,
}

type Key = (String, Tv);

#[derive(Default)]
pub struct PoolStatsTable {
    slab: slab::Slab<PoolStatsRow>,
    index: Index<Key>,
}

impl PoolStatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, row: PoolStatsRow) -> usize {
        let key = (row.poolinstance.clone(), row.createdate);
        let handle = self.slab.insert(row);
        self.index.insert(key, handle);
        handle
    }

    pub fn get(&self, handle: usize) -> Option<&PoolStatsRow> {
        self.slab.get(handle)
    }

    /// Snapshots for `poolinstance`, oldest first.
    pub fn for_instance(&self, poolinstance: &str) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cursor = self.index.find_after(&(poolinstance.to_string(), Tv::epoch()));
        while let Some((key, handle)) = cursor {
            if key.0 != poolinstance {
                break;
            }
            out.push(handle);
            cursor = self.index.next_after(&key, handle);
        }
        out
    }
}
