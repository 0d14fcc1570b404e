mod config;
mod error;
mod request;
mod stats;
mod worker;

pub mod cmap;

pub use cmap::{CMap, ConcurrentMap, OpenOptions};
pub use config::Config;
pub use error::{CMapError, Result};
pub use stats::Stats;
