use poolcore_core::{Tv, UserId, WorkinfoId};

use crate::index::Index;

/// The per-(user, worker, workinfo) aggregation of share accounting. This
/// is a live accumulator rather than a historised row: there is no
/// `expirydate`, updates mutate the existing row in place.
#[derive(Debug, Clone)]
pub struct ShareSummaryRow {
    pub userid: UserId,
    pub workername: String,
    pub workinfoid: WorkinfoId,
    pub diffacc: f64,
    pub diffsta: f64,
    pub sharesta: f64,
    pub complete: bool,
    pub createdate: Tv,
}

type ReportKey = (UserId, String, WorkinfoId);
type FlagKey = (WorkinfoId, UserId, String);

/// Indexed two ways: by (user, worker, workinfo) for reporting, and by
/// (workinfo, user, worker) for flagging a workinfo's summaries complete
/// once its work unit is finished.
#[derive(Default)]
pub struct ShareSummaryTable {
    slab: slab::Slab<ShareSummaryRow>,
    by_report: Index<ReportKey>,
    by_workinfoid: Index<FlagKey>,
}

impl ShareSummaryTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(row: &ShareSummaryRow) -> (ReportKey, FlagKey) {
        (
            (row.userid, row.workername.clone(), row.workinfoid),
            (row.workinfoid, row.userid, row.workername.clone()),
        )
    }

    pub fn insert(&mut self, row: ShareSummaryRow) -> usize {
        let (rk, fk) = Self::keys(&row);
        let handle = self.slab.insert(row);
        self.by_report.insert(rk, handle);
        self.by_workinfoid.insert(fk, handle);
        handle
    }

    pub fn get(&self, handle: usize) -> Option<&ShareSummaryRow> {
        self.slab.get(handle)
    }

    pub fn find(&self, userid: UserId, workername: &str, workinfoid: WorkinfoId) -> Option<usize> {
        self.by_report.find(&(userid, workername.to_string(), workinfoid))
    }

    /// Accumulates one more share's difficulty into the summary for
    /// `(userid, workername, workinfoid)`, creating the row if absent.
    pub fn accumulate(&mut self, userid: UserId, workername: &str, workinfoid: WorkinfoId, diff: f64, now: Tv) -> usize {
        match self.find(userid, workername, workinfoid) {
            Some(handle) => {
                self.slab[handle].diffacc += diff;
                self.slab[handle].diffsta += diff;
                self.slab[handle].sharesta += 1.0;
                handle
            }
            None => self.insert(ShareSummaryRow {
                userid,
                workername: workername.to_string(),
                workinfoid,
                diffacc: diff,
                diffsta: diff,
                sharesta: 1.0,
                complete: false,
                createdate: now,
            }),
        }
    }

    /// Marks every summary for `workinfoid` as complete, once its work
    /// unit has been superseded and no further shares can arrive against it.
    pub fn mark_complete(&mut self, workinfoid: WorkinfoId) {
        let probe = (workinfoid, UserId::MIN, String::new());
        let mut cursor = self.by_workinfoid.find_after(&probe);
        while let Some((key, handle)) = cursor {
            if key.0 != workinfoid {
                break;
            }
            self.slab[handle].complete = true;
            cursor = self.by_workinfoid.next_after(&key, handle);
        }
    }
}
