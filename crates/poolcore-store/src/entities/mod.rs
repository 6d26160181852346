pub mod auths;
pub mod blocks;
pub mod miningpayouts;
pub mod optioncontrol;
pub mod paymentaddresses;
pub mod payments;
pub mod poolstats;
pub mod shareerrors;
pub mod sharesummary;
pub mod shares;
pub mod useratts;
pub mod userstats;
pub mod users;
pub mod workers;
pub mod workerstatus;
pub mod workinfo;
