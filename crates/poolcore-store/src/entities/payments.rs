use poolcore_core::{Tv, UserId, DEFAULT_EXPIRY};
use std::cmp::Reverse;

use crate::index::Index;

#[derive(Debug, Clone)]
pub struct PaymentRow {
    pub userid: UserId,
    pub paydate: Tv,
    pub payaddress: String,
    pub amount: i64,
    pub createdate: Tv,
    pub expirydate: Tv,
}

type Key = (UserId, Tv, String, Reverse<Tv>);

#[derive(Default)]
pub struct PaymentsTable {
    slab: slab::Slab<PaymentRow>,
    by_userid_paydate_address: Index<Key>,
}

impl PaymentsTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(row: &PaymentRow) -> Key {
        (row.userid, row.paydate, row.payaddress.clone(), Reverse(row.expirydate))
    }

    pub fn insert(&mut self, mut row: PaymentRow) -> usize {
        row.expirydate = DEFAULT_EXPIRY;
        let k = Self::key(&row);
        let handle = self.slab.insert(row);
        self.by_userid_paydate_address.insert(k, handle);
        handle
    }

    pub fn get(&self, handle: usize) -> Option<&PaymentRow> {
        self.slab.get(handle)
    }
}
