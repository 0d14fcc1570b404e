//! CMap Module.

use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use crate::config::Config;
use crate::error::{CMapError, Result};
use crate::request::{Message, Outbox, Request, Response};
use crate::stats::Stats;
use crate::worker::runner::Runner;

/// ConcurrentMap API definitions.
pub trait ConcurrentMap {
    /// Get the value stored under `key`, `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Put a key/value pair into the map, overwriting any previous value.
    fn put(&self, key: String, value: String) -> Result<()>;

    /// Delete a key from the map. Returns whether the key was present.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Stop the worker once every request already queued has been served.
    fn close(&self) -> Result<()>;
}

enum Lifecycle {
    Running(JoinHandle<()>),
    Stopped,
}

/// Handle to a map owned by a dedicated worker thread.
///
/// Every call is a blocking round-trip to the worker, so handles hold no
/// state besides the delivery channel. Cloning a handle yields another
/// handle onto the same worker.
#[derive(Clone)]
pub struct CMap {
    /// OutBox for requests to the worker.
    outbox: Outbox,

    /// Shared by all clones, flipped to `Stopped` by the first `close`.
    lifecycle: Arc<Mutex<Lifecycle>>,
}

pub struct OpenOptions(Config);

impl OpenOptions {
    pub fn new() -> Self {
        Self(Config::default())
    }

    pub fn channel_capacity(mut self, value: usize) -> Self {
        self.0.channel_capacity = Some(value);
        self
    }

    pub fn thread_name(mut self, value: impl Into<String>) -> Self {
        self.0.thread_name = value.into();
        self
    }

    pub fn initial_capacity(mut self, value: usize) -> Self {
        self.0.initial_capacity = value;
        self
    }

    pub fn open(&self) -> Result<CMap> {
        CMap::open_with_options(self.0.clone())
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CMap {
    pub fn new() -> Result<Self> {
        Self::open_with_options(Config::default())
    }

    pub fn open_with_options(config: Config) -> Result<Self> {
        // `thread::Builder::spawn` panics on these.
        if config.thread_name.contains('\0') {
            return Err(CMapError::InvalidThreadName(config.thread_name));
        }

        let (outbox, inbox) = Outbox::channel(config.channel_capacity);
        let runner = Runner::new(inbox, &config);

        let worker = std::thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || runner.run())?;

        // wait until the worker is serving.
        let (hb_tx, hb_rx) = mpsc::channel();
        outbox
            .send(Message::HeartBeat(hb_tx))
            .map_err(|_| CMapError::Closed)?;

        for _ in hb_rx {}

        log::info!("config: {:?}", config);

        Ok(Self {
            outbox,
            lifecycle: Arc::new(Mutex::new(Lifecycle::Running(worker))),
        })
    }

    /// Snapshot of the worker's counters.
    pub fn stats(&self) -> Result<Stats> {
        let (tx, rx) = mpsc::channel();
        self.outbox
            .send(Message::Stats(tx))
            .map_err(|_| CMapError::Closed)?;
        rx.recv().map_err(|_| CMapError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        matches!(*self.lifecycle(), Lifecycle::Stopped)
    }

    fn lifecycle(&self) -> std::sync::MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Flip the lifecycle to `Stopped`, handing back the worker if it was
    /// still running. The lock is not held past this call.
    fn take_worker(&self) -> Option<JoinHandle<()>> {
        match std::mem::replace(&mut *self.lifecycle(), Lifecycle::Stopped) {
            Lifecycle::Running(worker) => Some(worker),
            Lifecycle::Stopped => None,
        }
    }

    /// Send `request` and block until the worker replies to it.
    ///
    /// A request that loses the race with `close` is dropped unanswered by
    /// the exiting worker, which disconnects its reply channel.
    fn call(&self, request: Request) -> Result<Response> {
        let (tx, rx) = mpsc::channel();
        self.outbox
            .send(Message::Request(request, tx))
            .map_err(|_| CMapError::Closed)?;

        rx.recv().map_err(|_| CMapError::Closed)
    }
}

impl ConcurrentMap for CMap {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let res = self.call(Request::Get {
            key: key.to_string(),
        })?;
        Ok(res.value)
    }

    fn put(&self, key: String, value: String) -> Result<()> {
        self.call(Request::Put { key, value })?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let res = self.call(Request::Delete {
            key: key.to_string(),
        })?;
        Ok(res.found)
    }

    fn close(&self) -> Result<()> {
        let worker = self.take_worker().ok_or(CMapError::AlreadyClosed)?;

        log::debug!("closing cmap, draining queued requests");

        let (tx, rx) = mpsc::channel();
        if self.outbox.send(Message::Stop(tx)).is_err() {
            log::error!("cmap worker was gone before close");
        }

        for _ in rx {}

        worker.join().map_err(|_| CMapError::WorkerPanicked)?;

        log::debug!("cmap closed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn empty_map() {
        init();
        let cm = CMap::new().unwrap();
        cm.close().unwrap();
        assert!(cm.is_closed());
    }

    #[test]
    fn insert_one_item() {
        init();
        let cm = CMap::new().unwrap();

        assert_eq!(cm.get("key").unwrap(), None);

        cm.put("key".to_string(), "value".to_string()).unwrap();
        assert_eq!(cm.get("key").unwrap().as_deref(), Some("value"));

        cm.close().unwrap();
    }

    #[test]
    fn empty_value_is_still_found() {
        init();
        let cm = CMap::new().unwrap();

        cm.put("key".to_string(), String::new()).unwrap();
        assert_eq!(cm.get("key").unwrap(), Some(String::new()));
        assert!(cm.delete("key").unwrap());

        cm.close().unwrap();
    }

    #[test]
    fn close_twice() {
        init();
        let cm = CMap::new().unwrap();
        cm.close().unwrap();
        assert!(matches!(cm.close(), Err(CMapError::AlreadyClosed)));
    }

    #[test]
    fn use_after_close() {
        init();
        let cm = CMap::new().unwrap();
        cm.put("key".to_string(), "value".to_string()).unwrap();
        cm.close().unwrap();

        assert!(matches!(cm.get("key"), Err(CMapError::Closed)));
        assert!(matches!(
            cm.put("key".to_string(), "other".to_string()),
            Err(CMapError::Closed)
        ));
        assert!(matches!(cm.delete("key"), Err(CMapError::Closed)));
        assert!(matches!(cm.stats(), Err(CMapError::Closed)));
    }

    #[test]
    fn clone_shares_lifecycle() {
        init();
        let cm = CMap::new().unwrap();
        let other = cm.clone();

        other.put("key".to_string(), "value".to_string()).unwrap();
        assert_eq!(cm.get("key").unwrap().as_deref(), Some("value"));

        cm.close().unwrap();
        assert!(other.is_closed());
        assert!(matches!(other.close(), Err(CMapError::AlreadyClosed)));
        assert!(matches!(other.get("key"), Err(CMapError::Closed)));
    }

    #[test]
    fn open_options() {
        init();
        let cm = OpenOptions::new()
            .channel_capacity(1)
            .thread_name("cmap-test")
            .initial_capacity(16)
            .open()
            .unwrap();

        cm.put("a".to_string(), "1".to_string()).unwrap();
        assert_eq!(cm.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(cm.stats().unwrap().entries, 1);

        cm.close().unwrap();
    }

    #[test]
    fn thread_name_with_nul_is_rejected() {
        init();
        let res = OpenOptions::new().thread_name("a\0b").open();
        assert!(matches!(res, Err(CMapError::InvalidThreadName(name)) if name == "a\0b"));
    }

    #[test]
    fn lifecycle_is_released_before_drain() {
        init();
        let cm = CMap::new().unwrap();
        let worker = cm.take_worker().unwrap();

        // worker still serving, lifecycle already free.
        assert!(cm.is_closed());
        assert!(matches!(cm.close(), Err(CMapError::AlreadyClosed)));
        assert_eq!(cm.get("key").unwrap(), None);

        drop(cm);
        worker.join().unwrap();
    }

    #[test]
    fn dropping_every_handle_stops_worker() {
        init();
        let cm = CMap::new().unwrap();
        let other = cm.clone();
        cm.put("key".to_string(), "value".to_string()).unwrap();

        let worker = cm.take_worker().unwrap();

        drop(cm);
        assert_eq!(other.get("key").unwrap().as_deref(), Some("value"));
        drop(other);

        // returns only once the worker thread has exited.
        worker.join().unwrap();
    }

    #[test]
    fn rendezvous_channel() {
        init();
        let cm = OpenOptions::new().channel_capacity(0).open().unwrap();
        cm.put("a".to_string(), "1".to_string()).unwrap();
        assert!(cm.delete("a").unwrap());
        cm.close().unwrap();
    }
}
