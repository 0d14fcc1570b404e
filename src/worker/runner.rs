//! Runner Module.
//!
//! The runner is the only owner of the map. Handles talk to it over
//! the inbox and every message is serviced to completion before the
//! next one is received.

use std::collections::HashMap;
use std::sync::mpsc;

use crate::config::Config;
use crate::request::{Message, Request, Response};
use crate::stats::Stats;

pub struct Runner {
    /// The map itself.
    pub(crate) mapping: HashMap<String, String>,

    /// Inbox of message.
    pub(crate) inbox: mpsc::Receiver<Message>,

    /// Operation counters.
    pub(crate) stats: Stats,
}

impl Runner {
    pub fn new(inbox: mpsc::Receiver<Message>, config: &Config) -> Self {
        Self {
            mapping: HashMap::with_capacity(config.initial_capacity),
            inbox,
            stats: Stats::default(),
        }
    }

    pub fn run(mut self) {
        log::info!("cmap worker started");
        while self.tick() {}
        log::info!(
            "cmap worker quitting after {} requests, dropping {} entries",
            self.stats.requests(),
            self.mapping.len()
        );
    }

    pub fn tick(&mut self) -> bool {
        match self.inbox.recv() {
            Ok(message) => self.handle_message(message),
            Err(_) => {
                // every handle dropped without closing.
                log::debug!("inbox disconnected, stopping");
                false
            }
        }
    }

    fn handle_message(&mut self, msg: Message) -> bool {
        match msg {
            Message::Request(request, reply) => {
                let response = self.apply(request);
                if reply.send(response).is_err() {
                    log::error!("requester went away before receiving its response");
                }
                true
            }
            Message::Stats(reply) => {
                if reply.send(self.snapshot()).is_err() {
                    log::error!("requester went away before receiving stats");
                }
                true
            }
            Message::Stop(dropper) => {
                drop(dropper);
                false
            }
            Message::HeartBeat(dropper) => {
                drop(dropper);
                true
            }
        }
    }

    fn apply(&mut self, request: Request) -> Response {
        log::trace!("servicing {:?}", request);

        match request {
            Request::Get { key } => {
                self.stats.gets += 1;
                let value = self.mapping.get(&key).cloned();
                let found = value.is_some();
                if found {
                    self.stats.get_hits += 1;
                }
                Response { value, found }
            }
            Request::Put { key, value } => {
                self.stats.puts += 1;
                self.mapping.insert(key, value);
                Response::ack()
            }
            Request::Delete { key } => {
                self.stats.deletes += 1;
                let found = self.mapping.remove(&key).is_some();
                if found {
                    self.stats.delete_hits += 1;
                }
                Response { value: None, found }
            }
        }
    }

    fn snapshot(&self) -> Stats {
        Stats {
            entries: self.mapping.len() as u64,
            ..self.stats
        }
    }
}
