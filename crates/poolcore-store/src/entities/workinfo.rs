use poolcore_core::{Height, Tv, WorkinfoId, DEFAULT_EXPIRY};

use crate::height::height_from_coinbase1_hex;
use crate::index::Index;

#[derive(Debug, Clone)]
pub struct WorkInfoRow {
    pub workinfoid: WorkinfoId,
    pub coinbase1: String,
    pub createdate: Tv,
    pub expirydate: Tv,
}

// Unlike every other historised entity, workinfo orders `expirydate`
// ascending rather than descending — `cmp_workinfo` compares it unswapped
// ("order by workinfoid asc,expirydate asc") — and the height index carries
// no expirydate component at all ("order by height asc,createdate asc").
type ByIdKey = (WorkinfoId, Tv);
type ByHeightKey = (Height, Tv);

/// Work units, indexed by their own id (the natural key) and again by the
/// height embedded in their coinbase — the latter lets callers walk work
/// units in chain order even though ids are assigned independently.
#[derive(Default)]
pub struct WorkInfoTable {
    slab: slab::Slab<WorkInfoRow>,
    by_workinfoid: Index<ByIdKey>,
    by_height: Index<ByHeightKey>,
}

impl WorkInfoTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(row: &WorkInfoRow) -> (ByIdKey, ByHeightKey) {
        let height = height_from_coinbase1_hex(&row.coinbase1);
        ((row.workinfoid, row.expirydate), (height, row.createdate))
    }

    pub fn insert(&mut self, mut row: WorkInfoRow) -> usize {
        row.expirydate = DEFAULT_EXPIRY;
        let (ik, hk) = Self::keys(&row);
        let handle = self.slab.insert(row);
        self.by_workinfoid.insert(ik, handle);
        self.by_height.insert(hk, handle);
        handle
    }

    pub fn get(&self, handle: usize) -> Option<&WorkInfoRow> {
        self.slab.get(handle)
    }

    pub fn find_current(&self, workinfoid: WorkinfoId) -> Option<usize> {
        self.by_workinfoid.find(&(workinfoid, DEFAULT_EXPIRY))
    }
}
