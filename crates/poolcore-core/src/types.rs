use serde::{Deserialize, Serialize};
use std::fmt;

/// A userid, as assigned by the (out-of-scope) user database.
pub type UserId = i64;

/// A work unit identifier, monotonically increasing.
pub type WorkinfoId = i64;

/// A block height.
pub type Height = i32;

/// An authentication-event identifier.
pub type AuthId = i64;

// ── Tv ───────────────────────────────────────────────────────────────────────

/// A UTC timestamp represented as a (seconds, microseconds) pair.
///
/// `usec` is always in `0..1_000_000`; comparisons and ordering compare
/// `sec` first, then `usec`, exactly like the pair would compare as a tuple.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tv {
    pub sec: i64,
    pub usec: i64,
}

impl Tv {
    pub const fn new(sec: i64, usec: i64) -> Self {
        Self { sec, usec }
    }

    pub const fn epoch() -> Self {
        Self { sec: 0, usec: 0 }
    }

    /// True iff this timestamp is at or beyond [`crate::constants::COMPARE_EXPIRY`],
    /// meaning it should be canonicalised to [`crate::constants::DEFAULT_EXPIRY`].
    pub fn is_past_compare_expiry(&self) -> bool {
        *self >= crate::constants::COMPARE_EXPIRY
    }

    /// True iff this is the current-row sentinel.
    pub fn is_default_expiry(&self) -> bool {
        *self == crate::constants::DEFAULT_EXPIRY
    }
}

impl fmt::Debug for Tv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tv({}.{:06})", self.sec, self.usec)
    }
}

impl fmt::Display for Tv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.sec, self.usec)
    }
}
