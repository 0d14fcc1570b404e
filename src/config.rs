//! Config and Default Constants Definitions Module.

pub(crate) const DEFAULT_THREAD_NAME: &str = "cmap-worker";

#[derive(Debug, Clone)]
pub struct Config {
    /// Number of requests that may sit in the delivery channel before
    /// senders block. `None` means the channel is unbounded.
    pub channel_capacity: Option<usize>,

    /// Name given to the worker thread.
    pub thread_name: String,

    /// The worker pre-allocates room for this many entries.
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            channel_capacity: None,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            initial_capacity: 0,
        }
    }
}
