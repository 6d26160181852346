use poolcore_core::{Tv, UserId};

use crate::index::Index;

/// A per-worker or per-user hashrate sample. Append-only, no expirydate:
/// history here is a time series, not a superseded-row sequence.
#[derive(Debug, Clone)]
pub struct UserStatsRow {
    pub userid: UserId,
    pub workername: String,
    pub poolinstance: String,
    pub statsdate: Tv,
    pub createdate: Tv,
    pub elapsed: i64,
    pub hashrate: f64,
    pub hashrate5m: f64,
    pub hashrate1hr: f64,
    pub hashrate24hr: f64,
    pub summarylevel: String,
    pub summarycount: i32,
}

type HomepageKey = (UserId, Tv, String, String);
type WorkernameKey = (UserId, String);
type SummarisationKey = (Tv, UserId, String, String);
type WorkerstatusKey = (UserId, String, Tv, String);

/// Four index views over the same rows, one per access pattern the
/// reporting and summarisation paths each need:
/// - `by_homepage`: userid, statsdate, poolinstance, workername — the
///   order the user homepage summarises over.
/// - `by_workername`: userid, workername — a transient grouping used
///   while summing a user's current stats across workers.
/// - `by_statsdate`: statsdate, userid, workername, poolinstance — the
///   order batch summarisation walks rows in.
/// - `by_workerstatus`: userid, workername, statsdate, poolinstance —
///   built while loading, to update `workerstatus` and to detect rows
///   already present when reloading.
#[derive(Default)]
pub struct UserStatsTable {
    slab: slab::Slab<UserStatsRow>,
    by_homepage: Index<HomepageKey>,
    by_workername: Index<WorkernameKey>,
    by_statsdate: Index<SummarisationKey>,
    by_workerstatus: Index<WorkerstatusKey>,
}

impl UserStatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(row: &UserStatsRow) -> (HomepageKey, WorkernameKey, SummarisationKey, WorkerstatusKey) {
        (
            (row.userid, row.statsdate, row.poolinstance.clone(), row.workername.clone()),
            (row.userid, row.workername.clone()),
            (row.statsdate, row.userid, row.workername.clone(), row.poolinstance.clone()),
            (row.userid, row.workername.clone(), row.statsdate, row.poolinstance.clone()),
        )
    }

    pub fn insert(&mut self, row: UserStatsRow) -> usize {
        let (hk, wk, sk, tk) = Self::keys(&row);
        let handle = self.slab.insert(row);
        self.by_homepage.insert(hk, handle);
        self.by_workername.insert(wk, handle);
        self.by_statsdate.insert(sk, handle);
        self.by_workerstatus.insert(tk, handle);
        handle
    }

    pub fn get(&self, handle: usize) -> Option<&UserStatsRow> {
        self.slab.get(handle)
    }

    /// Whether `userid`/`workername`/`statsdate`/`poolinstance` was
    /// already recorded — used to discard rows already present in
    /// persistent storage when replaying history.
    pub fn contains(&self, userid: UserId, workername: &str, statsdate: Tv, poolinstance: &str) -> bool {
        self.by_workerstatus
            .find(&(userid, workername.to_string(), statsdate, poolinstance.to_string()))
            .is_some()
    }

    /// All samples for a user across workers, in homepage-summary order.
    pub fn for_user(&self, userid: UserId) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cursor = self.by_homepage.find_after(&(userid, Tv::epoch(), String::new(), String::new()));
        while let Some((key, handle)) = cursor {
            if key.0 != userid {
                break;
            }
            out.push(handle);
            cursor = self.by_homepage.next_after(&key, handle);
        }
        out
    }
}
