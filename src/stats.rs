//! Stats Module.

/// Counters kept by the worker. Only the worker thread touches them.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Entries currently held.
    pub entries: u64,
    pub gets: u64,
    pub get_hits: u64,
    pub puts: u64,
    pub deletes: u64,
    pub delete_hits: u64,
}

impl Stats {
    /// Total number of get/put/delete requests serviced.
    pub fn requests(&self) -> u64 {
        self.gets + self.puts + self.deletes
    }
}
