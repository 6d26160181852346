//! The hand-off boundary to the upstream stratifier process. The wire
//! protocol and transport of that process are out of scope here; this trait
//! is the documented interface the connector calls into.

use std::sync::mpsc;

/// Everything the connector needs from its upstream collaborator.
pub trait StratifierLink: Send + Sync {
    /// A complete JSON line (newline-stripped) received from a miner,
    /// already tagged with its `client_id` field.
    fn forward(&self, json_line: String);

    /// Notifies the stratifier that a session has gone away.
    fn drop_client(&self, client_id: i64);
}

/// A message sent to the stratifier, as observed by a [`ChannelStratifierLink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StratifierMessage {
    Forward(String),
    DropClient(i64),
}

/// An in-process `StratifierLink` backed by an `mpsc::Sender`, for wiring the
/// connector to an in-process consumer (or to a test harness that drains the
/// receiving end). A real deployment would instead bridge to the external
/// stratifier's actual IPC channel.
pub struct ChannelStratifierLink {
    tx: mpsc::Sender<StratifierMessage>,
}

impl ChannelStratifierLink {
    pub fn new() -> (Self, mpsc::Receiver<StratifierMessage>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl StratifierLink for ChannelStratifierLink {
    fn forward(&self, json_line: String) {
        if self.tx.send(StratifierMessage::Forward(json_line)).is_err() {
            tracing::warn!("stratifier link receiver dropped, discarding forwarded message");
        }
    }

    fn drop_client(&self, client_id: i64) {
        if self.tx.send(StratifierMessage::DropClient(client_id)).is_err() {
            tracing::warn!(client_id, "stratifier link receiver dropped, discarding dropclient");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwards_and_drops_over_channel() {
        let (link, rx) = ChannelStratifierLink::new();
        link.forward("{\"method\":\"x\"}".to_string());
        link.drop_client(7);
        assert_eq!(rx.recv().unwrap(), StratifierMessage::Forward("{\"method\":\"x\"}".to_string()));
        assert_eq!(rx.recv().unwrap(), StratifierMessage::DropClient(7));
    }
}
