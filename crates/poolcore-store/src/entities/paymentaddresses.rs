use poolcore_core::{Tv, UserId, DEFAULT_EXPIRY};
use std::cmp::Reverse;

use crate::index::Index;

#[derive(Debug, Clone)]
pub struct PaymentAddressRow {
    pub userid: UserId,
    pub payaddress: String,
    pub payratio: i32,
    pub createdate: Tv,
    pub expirydate: Tv,
}

type Key = (UserId, Reverse<Tv>, String);

#[derive(Default)]
pub struct PaymentAddressesTable {
    slab: slab::Slab<PaymentAddressRow>,
    by_userid: Index<Key>,
}

impl PaymentAddressesTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(row: &PaymentAddressRow) -> Key {
        (row.userid, Reverse(row.expirydate), row.payaddress.clone())
    }

    pub fn insert(&mut self, mut row: PaymentAddressRow) -> usize {
        row.expirydate = DEFAULT_EXPIRY;
        let k = Self::key(&row);
        let handle = self.slab.insert(row);
        self.by_userid.insert(k, handle);
        handle
    }

    pub fn get(&self, handle: usize) -> Option<&PaymentAddressRow> {
        self.slab.get(handle)
    }

    /// Finds the first payment address on record for `userid`, in index
    /// order (newest expiry first, then lowest address), returning it
    /// only if it is still current. Matches the historical single-address
    /// lookup; see [`Self::current_addresses`] for the common case of a
    /// user with more than one live payout address.
    pub fn find_first(&self, userid: UserId) -> Option<usize> {
        let probe = (userid, Reverse(DEFAULT_EXPIRY), String::new());
        let (key, handle) = self.by_userid.find_after(&probe)?;
        if key.0 == userid && self.slab[handle].expirydate.is_default_expiry() {
            Some(handle)
        } else {
            None
        }
    }

    /// All currently-valid payment addresses for `userid`.
    pub fn current_addresses(&self, userid: UserId) -> Vec<usize> {
        let mut out = Vec::new();
        let probe = (userid, Reverse(DEFAULT_EXPIRY), String::new());
        let mut cursor = self.by_userid.find_after(&probe);
        while let Some((key, handle)) = cursor {
            if key.0 != userid {
                break;
            }
            if self.slab[handle].expirydate.is_default_expiry() {
                out.push(handle);
            }
            cursor = self.by_userid.next_after(&key, handle);
        }
        out
    }
}
