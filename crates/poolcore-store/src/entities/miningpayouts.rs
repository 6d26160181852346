use poolcore_core::{Height, Tv, UserId, DEFAULT_EXPIRY};

use crate::index::Index;

/// At most one payout row per (block, user); superseding a payout amount
/// simply overwrites the existing row rather than going through the usual
/// expire-then-insert dance, since there both only the current amount and
/// its block/user association matter for downstream accounting.
#[derive(Debug, Clone)]
pub struct MiningPayoutRow {
    pub height: Height,
    pub userid: UserId,
    pub amount: i64,
    pub createdate: Tv,
    pub expirydate: Tv,
}

type Key = (Height, UserId);

#[derive(Default)]
pub struct MiningPayoutsTable {
    slab: slab::Slab<MiningPayoutRow>,
    by_height_userid: Index<Key>,
}

impl MiningPayoutsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: usize) -> Option<&MiningPayoutRow> {
        self.slab.get(handle)
    }

    pub fn find(&self, height: Height, userid: UserId) -> Option<usize> {
        self.by_height_userid.find(&(height, userid))
    }

    /// Inserts a payout, or overwrites the amount of the existing one for
    /// the same (height, userid).
    pub fn set_amount(&mut self, height: Height, userid: UserId, amount: i64, now: Tv) -> usize {
        if let Some(handle) = self.find(height, userid) {
            self.slab[handle].amount = amount;
            return handle;
        }
        let row = MiningPayoutRow {
            height,
            userid,
            amount,
            createdate: now,
            expirydate: DEFAULT_EXPIRY,
        };
        let key = (row.height, row.userid);
        let handle = self.slab.insert(row);
        self.by_height_userid.insert(key, handle);
        handle
    }
}
