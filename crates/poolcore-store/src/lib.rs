//! The in-memory accounting store: one reader-writer-locked table per
//! entity, each holding a generational arena of records plus the ordered
//! indexes declared for that entity.
//!
//! Every entity gets its own lock rather than the whole store sharing
//! one, matching the concurrency model that lets readers of `users` make
//! progress while a writer is busy superseding a `workers` row: there is
//! no cross-entity transaction, and callers that need one must coordinate
//! it themselves.

pub mod entities;
pub mod height;
pub mod index;

use std::sync::RwLock;

pub use entities::auths::{AuthRow, AuthsTable};
pub use entities::blocks::{BlockRow, BlockState, BlocksTable};
pub use entities::miningpayouts::{MiningPayoutRow, MiningPayoutsTable};
pub use entities::optioncontrol::{OptionControlRow, OptionControlTable};
pub use entities::paymentaddresses::{PaymentAddressRow, PaymentAddressesTable};
pub use entities::payments::{PaymentRow, PaymentsTable};
pub use entities::poolstats::{PoolStatsRow, PoolStatsTable};
pub use entities::shareerrors::{ShareErrorRow, ShareErrorsTable};
pub use entities::shares::{ShareRow, SharesTable};
pub use entities::sharesummary::{ShareSummaryRow, ShareSummaryTable};
pub use entities::useratts::{UserAttRow, UserAttsTable};
pub use entities::userstats::{UserStatsRow, UserStatsTable};
pub use entities::users::{UserRow, UsersTable};
pub use entities::workers::{WorkerRow, WorkersTable};
pub use entities::workerstatus::{WorkerStatusRow, WorkerStatusTable};
pub use entities::workinfo::{WorkInfoRow, WorkInfoTable};

/// The complete accounting store, one lock per entity.
#[derive(Default)]
pub struct Store {
    pub users: RwLock<UsersTable>,
    pub useratts: RwLock<UserAttsTable>,
    pub workers: RwLock<WorkersTable>,
    pub workerstatus: RwLock<WorkerStatusTable>,
    pub paymentaddresses: RwLock<PaymentAddressesTable>,
    pub payments: RwLock<PaymentsTable>,
    pub optioncontrol: RwLock<OptionControlTable>,
    pub workinfo: RwLock<WorkInfoTable>,
    pub shares: RwLock<SharesTable>,
    pub shareerrors: RwLock<ShareErrorsTable>,
    pub sharesummary: RwLock<ShareSummaryTable>,
    pub blocks: RwLock<BlocksTable>,
    pub miningpayouts: RwLock<MiningPayoutsTable>,
    pub auths: RwLock<AuthsTable>,
    pub poolstats: RwLock<PoolStatsTable>,
    pub userstats: RwLock<UserStatsTable>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }
}
