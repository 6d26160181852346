use poolcore_core::{Height, Tv, UserId, DEFAULT_EXPIRY};
use std::cmp::Reverse;

use crate::index::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    New,
    Confirm,
    Confirmed42,
    Orphan,
}

#[derive(Debug, Clone)]
pub struct BlockRow {
    pub height: Height,
    pub blockhash: String,
    pub confirmed: BlockState,
    pub userid: UserId,
    pub workername: String,
    pub statsconfirmed: bool,
    pub createdate: Tv,
    pub expirydate: Tv,
}

type Key = (Height, String, Reverse<Tv>);

#[derive(Default)]
pub struct BlocksTable {
    slab: slab::Slab<BlockRow>,
    by_height: Index<Key>,
}

impl BlocksTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(row: &BlockRow) -> Key {
        (row.height, row.blockhash.clone(), Reverse(row.expirydate))
    }

    pub fn insert(&mut self, mut row: BlockRow) -> usize {
        row.expirydate = DEFAULT_EXPIRY;
        let k = Self::key(&row);
        let handle = self.slab.insert(row);
        self.by_height.insert(k, handle);
        handle
    }

    pub fn get(&self, handle: usize) -> Option<&BlockRow> {
        self.slab.get(handle)
    }

    pub fn find_current(&self, height: Height, blockhash: &str) -> Option<usize> {
        self.by_height.find(&(height, blockhash.to_string(), Reverse(DEFAULT_EXPIRY)))
    }

    /// Finds the most recent current, non-`NEW` block at or below
    /// `height`, walking backwards and skipping rows that don't qualify —
    /// used to locate the block a new one builds on.
    pub fn find_prev_block(&self, height: Height) -> Option<usize> {
        let probe = (height, String::new(), Reverse(poolcore_core::Tv::epoch()));
        let mut cursor = self.by_height.find_before(&probe);
        while let Some((key, handle)) = cursor {
            let row = &self.slab[handle];
            if row.confirmed != BlockState::New && row.expirydate.is_default_expiry() {
                return Some(handle);
            }
            cursor = self.by_height.prev_before(&key, handle);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(height: Height, hash: &str, state: BlockState) -> BlockRow {
        BlockRow {
            height,
            blockhash: hash.to_string(),
            confirmed: state,
            userid: 1,
            workername: "alice.1".to_string(),
            statsconfirmed: false,
            createdate: poolcore_core::Tv::epoch(),
            expirydate: DEFAULT_EXPIRY,
        }
    }

    #[test]
    fn find_prev_block_skips_new_blocks() {
        let mut t = BlocksTable::new();
        let confirmed = t.insert(row(100, "aaa", BlockState::Confirm));
        t.insert(row(105, "bbb", BlockState::New));

        let found = t.find_prev_block(110).unwrap();
        assert_eq!(found, confirmed);
    }
}
