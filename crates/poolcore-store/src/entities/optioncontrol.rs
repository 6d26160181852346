use poolcore_core::{Height, Tv, DATE_BEGIN, DEFAULT_EXPIRY, OPTIONCONTROL_DEFAULT_HEIGHT, OPTIONCONTROL_PROBE_HEIGHT};
use std::cmp::Reverse;

use crate::index::Index;

#[derive(Debug, Clone)]
pub struct OptionControlRow {
    pub optionname: String,
    pub optionvalue: String,
    pub activationdate: Tv,
    pub activationheight: Height,
    pub createdate: Tv,
    pub expirydate: Tv,
}

impl OptionControlRow {
    /// Builds a row using the walk-ignoring defaults for whichever
    /// dimension the caller doesn't care about.
    pub fn new(optionname: impl Into<String>, optionvalue: impl Into<String>, createdate: Tv) -> Self {
        Self {
            optionname: optionname.into(),
            optionvalue: optionvalue.into(),
            activationdate: DATE_BEGIN,
            activationheight: OPTIONCONTROL_DEFAULT_HEIGHT,
            createdate,
            expirydate: DEFAULT_EXPIRY,
        }
    }
}

type Key = (String, Tv, Height, Reverse<Tv>);

#[derive(Default)]
pub struct OptionControlTable {
    slab: slab::Slab<OptionControlRow>,
    by_name: Index<Key>,
}

impl OptionControlTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(row: &OptionControlRow) -> Key {
        (
            row.optionname.clone(),
            row.activationdate,
            row.activationheight,
            Reverse(row.expirydate),
        )
    }

    pub fn insert(&mut self, mut row: OptionControlRow) -> usize {
        row.expirydate = DEFAULT_EXPIRY;
        let k = Self::key(&row);
        let handle = self.slab.insert(row);
        self.by_name.insert(k, handle);
        handle
    }

    pub fn get(&self, handle: usize) -> Option<&OptionControlRow> {
        self.slab.get(handle)
    }

    /// Resolves the currently-active row for `optionname`: among rows
    /// that are current, have `activationheight <= pool_height`, and
    /// `activationdate <= now`, returns the one maximising
    /// `(activationdate, activationheight)` lexicographically.
    pub fn resolve(&self, optionname: &str, now: Tv, pool_height: Height) -> Option<usize> {
        let probe = (optionname.to_string(), DATE_BEGIN, OPTIONCONTROL_PROBE_HEIGHT, Reverse(DEFAULT_EXPIRY));
        let mut cursor = self.by_name.find_after(&probe);
        let mut best: Option<(usize, Tv, Height)> = None;

        while let Some((key, handle)) = cursor {
            if key.0 != optionname {
                break;
            }
            let row = &self.slab[handle];
            let eligible = row.expirydate.is_default_expiry()
                && row.activationheight <= pool_height
                && row.activationdate <= now;
            if eligible {
                let better = match &best {
                    None => true,
                    Some((_, bd, bh)) => {
                        row.activationdate > *bd
                            || (row.activationdate == *bd && row.activationheight > *bh)
                    }
                };
                if better {
                    best = Some((handle, row.activationdate, row.activationheight));
                }
            }
            cursor = self.by_name.next_after(&key, handle);
        }

        best.map(|(handle, _, _)| handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, act_date: Tv, act_height: Height) -> OptionControlRow {
        OptionControlRow {
            optionname: name.to_string(),
            optionvalue: "v".to_string(),
            activationdate: act_date,
            activationheight: act_height,
            createdate: Tv::epoch(),
            expirydate: DEFAULT_EXPIRY,
        }
    }

    #[test]
    fn resolves_by_activationdate_then_height() {
        let mut t = OptionControlTable::new();
        let r1 = t.insert(row("fee", Tv::new(1_577_836_800, 0), 1));
        let _r2 = t.insert(row("fee", Tv::new(1_577_836_800, 0), 100));
        let r3 = t.insert(row("fee", Tv::new(1_580_515_200, 0), 1));

        let now = Tv::new(1_583_020_800, 0);
        let best = t.resolve("fee", now, 50).unwrap();

        assert_eq!(best, r3);
        assert_ne!(best, r1);
    }

    #[test]
    fn no_eligible_rows_returns_none() {
        let mut t = OptionControlTable::new();
        t.insert(row("fee", Tv::new(1_577_836_800, 0), 1000));
        assert!(t.resolve("fee", Tv::new(1_583_020_800, 0), 50).is_none());
    }
}
