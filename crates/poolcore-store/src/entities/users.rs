use poolcore_core::{Tv, UserId, DEFAULT_EXPIRY};
use std::cmp::Reverse;

use crate::index::Index;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub userid: UserId,
    pub username: String,
    pub salt: String,
    pub passwordhash: String,
    pub createdate: Tv,
    pub expirydate: Tv,
}

type ByUsernameKey = (String, Reverse<Tv>);
type ByUseridKey = (UserId, Reverse<Tv>);

/// Users indexed two ways — by username and by userid — since lookups
/// arrive under either key depending on whether the caller already holds
/// an authenticated session.
#[derive(Default)]
pub struct UsersTable {
    slab: slab::Slab<UserRow>,
    by_username: Index<ByUsernameKey>,
    by_userid: Index<ByUseridKey>,
}

impl UsersTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(row: &UserRow) -> (ByUsernameKey, ByUseridKey) {
        (
            (row.username.clone(), Reverse(row.expirydate)),
            (row.userid, Reverse(row.expirydate)),
        )
    }

    /// Inserts a brand-new current row (expirydate forced to
    /// [`DEFAULT_EXPIRY`]) and returns its handle.
    pub fn insert(&mut self, mut row: UserRow) -> usize {
        row.expirydate = DEFAULT_EXPIRY;
        let (uk, ik) = Self::keys(&row);
        let handle = self.slab.insert(row);
        self.by_username.insert(uk, handle);
        self.by_userid.insert(ik, handle);
        handle
    }

    /// Expires the current row for `userid` (if any) and inserts
    /// `new_row` as the new current row, returning its handle.
    pub fn supersede(&mut self, userid: UserId, now: Tv, new_row: UserRow) -> usize {
        if let Some(handle) = self.find_current_by_userid(userid) {
            let (old_uk, old_ik) = Self::keys(&self.slab[handle]);
            self.by_username.remove(&old_uk, handle);
            self.by_userid.remove(&old_ik, handle);
            self.slab[handle].expirydate = now;
            let (uk, ik) = Self::keys(&self.slab[handle]);
            self.by_username.insert(uk, handle);
            self.by_userid.insert(ik, handle);
        }
        self.insert(new_row)
    }

    pub fn get(&self, handle: usize) -> Option<&UserRow> {
        self.slab.get(handle)
    }

    pub fn find_current_by_username(&self, username: &str) -> Option<usize> {
        self.by_username.find(&(username.to_string(), Reverse(DEFAULT_EXPIRY)))
    }

    pub fn find_current_by_userid(&self, userid: UserId) -> Option<usize> {
        self.by_userid.find(&(userid, Reverse(DEFAULT_EXPIRY)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(userid: UserId, username: &str) -> UserRow {
        UserRow {
            userid,
            username: username.to_string(),
            salt: String::new(),
            passwordhash: "deadbeef".repeat(8),
            createdate: Tv::new(1000, 0),
            expirydate: DEFAULT_EXPIRY,
        }
    }

    #[test]
    fn finds_current_row_by_either_key() {
        let mut t = UsersTable::new();
        t.insert(row(1, "alice"));
        let by_name = t.find_current_by_username("alice").unwrap();
        let by_id = t.find_current_by_userid(1).unwrap();
        assert_eq!(by_name, by_id);
    }

    #[test]
    fn supersede_hides_old_row_from_current_lookup() {
        let mut t = UsersTable::new();
        t.insert(row(1, "alice"));
        let mut updated = row(1, "alice");
        updated.passwordhash = "cafebabe".repeat(8);
        let new_handle = t.supersede(1, Tv::new(2000, 0), updated);

        let current = t.find_current_by_userid(1).unwrap();
        assert_eq!(current, new_handle);
        assert_eq!(t.get(current).unwrap().passwordhash, "cafebabe".repeat(8));
    }
}
