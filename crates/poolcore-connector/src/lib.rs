//! TCP front-end that accepts miner connections, demultiplexes
//! line-delimited JSON, tags each message with a stable client id, and
//! relays it to the upstream stratifier over a local control channel.

pub mod acceptor;
pub mod connector;
pub mod control;
pub mod framing;
pub mod link;
pub mod receiver;
pub mod session;

pub use connector::{spawn, ConnectorConfig, ConnectorHandle};
pub use link::{ChannelStratifierLink, StratifierLink, StratifierMessage};
pub use session::{ClientSession, SessionTable, SharedSessions};
