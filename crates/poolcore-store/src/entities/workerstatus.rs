use poolcore_core::{PoolError, Tv, UserId};

use crate::index::Index;

/// In-memory-only worker state, created on demand rather than loaded from
/// history. No `expirydate`: there is exactly one live row per worker,
/// updated in place.
#[derive(Debug, Clone)]
pub struct WorkerStatusRow {
    pub userid: UserId,
    pub workername: String,
    pub lastshare: Tv,
    pub lastauth: Tv,
}

type Key = (UserId, String);

#[derive(Default)]
pub struct WorkerStatusTable {
    slab: slab::Slab<WorkerStatusRow>,
    by_userid_workername: Index<Key>,
}

impl WorkerStatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: usize) -> Option<&WorkerStatusRow> {
        self.slab.get(handle)
    }

    pub fn get_mut(&mut self, handle: usize) -> Option<&mut WorkerStatusRow> {
        self.slab.get_mut(handle)
    }

    fn find(&self, userid: UserId, workername: &str) -> Option<usize> {
        self.by_userid_workername.find(&(userid, workername.to_string()))
    }

    /// Looks up a worker's status, allocating a fresh zeroed row when
    /// `create` is true and none exists. When `create` is false and the
    /// row is missing, this is a caller bug — the worker-status cache is
    /// expected to have been primed by worker creation — so it is
    /// reported rather than panicked on, letting the caller decide how
    /// loudly to fail.
    pub fn find_create(
        &mut self,
        userid: UserId,
        workername: &str,
        create: bool,
    ) -> Result<usize, PoolError> {
        if let Some(handle) = self.find(userid, workername) {
            return Ok(handle);
        }
        if !create {
            tracing::error!(userid, workername, "missing workerstatus");
            return Err(PoolError::WorkerStatusMissing {
                userid,
                workername: workername.to_string(),
            });
        }
        let row = WorkerStatusRow {
            userid,
            workername: workername.to_string(),
            lastshare: Tv::epoch(),
            lastauth: Tv::epoch(),
        };
        let key = (row.userid, row.workername.clone());
        let handle = self.slab.insert(row);
        self.by_userid_workername.insert(key, handle);
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_without_create_is_reported() {
        let mut t = WorkerStatusTable::new();
        let err = t.find_create(1, "alice.1", false).unwrap_err();
        assert!(matches!(err, PoolError::WorkerStatusMissing { .. }));
    }

    #[test]
    fn missing_with_create_allocates_a_zeroed_row() {
        let mut t = WorkerStatusTable::new();
        let handle = t.find_create(1, "alice.1", true).unwrap();
        let row = t.get(handle).unwrap();
        assert_eq!(row.lastshare, Tv::epoch());

        let again = t.find_create(1, "alice.1", false).unwrap();
        assert_eq!(again, handle);
    }
}
