use thiserror::Error;

/// Errors surfaced across the codec, store, credential, transfer, and
/// connector crates. These are the *input-error* and *expected-absence*
/// variants; programmer errors are handled by logging + `panic!` at the
/// call site rather than being represented as a recoverable `Err`.
#[derive(Debug, Error)]
pub enum PoolError {
    // ── Field codec ──────────────────────────────────────────────────────────
    #[error("field {0}: malformed timestamp '{1}'")]
    BadTimestamp(String, String),

    #[error("field {0}: malformed compact timestamp '{1}'")]
    BadCompactTimestamp(String, String),

    // ── Credential engine ────────────────────────────────────────────────────
    #[error("credential field {field} has the wrong length: expected {expected} hex chars, got {got}")]
    BadCredentialLength {
        field: String,
        expected: usize,
        got: usize,
    },

    // ── Transfer parameter arena ─────────────────────────────────────────────
    #[error("failed.missing {0}")]
    TransferMissing(String),

    #[error("failed.short {0}")]
    TransferTooShort(String),

    #[error("failed.invalid {0}")]
    TransferInvalid(String),

    #[error("failed.REG {0}")]
    TransferBadRegex(String),

    // ── Store ─────────────────────────────────────────────────────────────────
    #[error("no current row for key {0}")]
    NotFound(String),

    #[error("workerstatus missing for user {userid} worker {workername}")]
    WorkerStatusMissing { userid: i64, workername: String },

    // ── Connector ─────────────────────────────────────────────────────────────
    #[error("client {0} not connected")]
    ClientNotConnected(i64),

    #[error("line exceeds MAX_MSGSIZE")]
    LineTooLong,

    #[error("invalid JSON from client {0}: {1}")]
    InvalidJson(i64, String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
