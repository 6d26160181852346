//! Pool-wide sentinel constants.

use crate::types::Tv;

/// Sentinel marking a row as "not yet expired" / currently valid.
/// Corresponds to 6666-06-06 00:00:00 UTC.
pub const DEFAULT_EXPIRY: Tv = Tv::new(148_204_944_000, 0);

/// Threshold below [`DEFAULT_EXPIRY`]; any parsed timestamp at or beyond this
/// value is canonicalised to `DEFAULT_EXPIRY`. Corresponds to 6600-01-01
/// 00:00:00 UTC — far enough out that no real row will ever legitimately
/// carry it, but safely below `DEFAULT_EXPIRY` itself.
pub const COMPARE_EXPIRY: Tv = Tv::new(146_108_707_200, 0);

/// The epoch-zero sentinel used as the lower bound in `find_after` probes.
pub const DATE_BEGIN: Tv = Tv::new(0, 0);

/// Maximum line length accepted from a miner connection, including the
/// trailing newline.
pub const MAX_MSGSIZE: usize = 1024;

/// Per-session receive buffer size.
pub const PAGESIZE: usize = 4096;

/// Default height used for option-control rows that don't specify one —
/// lets the height dimension be ignored entirely.
pub const OPTIONCONTROL_DEFAULT_HEIGHT: i32 = 1;

/// One below [`OPTIONCONTROL_DEFAULT_HEIGHT`] — the starting probe height
/// for the option-control walk, chosen so it sorts below every row that
/// left `activationheight` at its default.
pub const OPTIONCONTROL_PROBE_HEIGHT: i32 = OPTIONCONTROL_DEFAULT_HEIGHT - 1;

/// Default TCP listen port when no `serverurl` is configured.
pub const DEFAULT_LISTEN_PORT: u16 = 3333;

/// Number of bind-retry attempts before giving up.
pub const BIND_RETRY_ATTEMPTS: u32 = 25;

/// Delay between bind-retry attempts.
pub const BIND_RETRY_DELAY_SECS: u64 = 5;
