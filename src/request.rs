//! request handling

use std::sync::mpsc;

use crate::stats::Stats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Get { key: String },                // Read Request
    Put { key: String, value: String }, // Write Request
    Delete { key: String },             // Write Request
}

/// Reply to a single `Request`.
///
/// `value` is only set for a `Get` hit, `found` is meaningful for
/// `Get` and `Delete`. A `Put` is acknowledged with the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub value: Option<String>,
    pub found: bool,
}

impl Response {
    pub fn ack() -> Self {
        Self::default()
    }
}

pub enum Message {
    Request(Request, mpsc::Sender<Response>),
    Stats(mpsc::Sender<Stats>),
    Stop(mpsc::Sender<()>),
    HeartBeat(mpsc::Sender<()>),
}

/// Sending half of the delivery channel, bounded or not.
#[derive(Clone)]
pub enum Outbox {
    Unbounded(mpsc::Sender<Message>),
    Bounded(mpsc::SyncSender<Message>),
}

impl Outbox {
    pub fn channel(capacity: Option<usize>) -> (Self, mpsc::Receiver<Message>) {
        match capacity {
            None => {
                let (tx, rx) = mpsc::channel();
                (Outbox::Unbounded(tx), rx)
            }
            Some(bound) => {
                let (tx, rx) = mpsc::sync_channel(bound);
                (Outbox::Bounded(tx), rx)
            }
        }
    }

    /// Fails only when the receiving worker is gone.
    pub fn send(&self, msg: Message) -> Result<(), mpsc::SendError<Message>> {
        match self {
            Outbox::Unbounded(tx) => tx.send(msg),
            Outbox::Bounded(tx) => tx.send(msg),
        }
    }
}
