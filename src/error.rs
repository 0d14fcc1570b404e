//! lib error definitions.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CMapError>;

#[derive(Debug, Error)]
pub enum CMapError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("concurrent map is closed")]
    Closed,

    #[error("concurrent map is already closed")]
    AlreadyClosed,

    #[error("invalid worker thread name {:?}", .0)]
    InvalidThreadName(String),

    #[error("worker thread panicked")]
    WorkerPanicked,
}
