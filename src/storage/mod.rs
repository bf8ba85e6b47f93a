//! Storage module for the rip counter
//!
//! The only state Link-Ripper keeps between requests is the number of
//! completed rips, stored as a decimal integer in a flat file. The core
//! pipeline never touches it; the counter is attached to a
//! [`Ripper`](crate::Ripper) as a [`RipObserver`](crate::ripper::RipObserver).

mod counter;

pub use counter::FileRipCounter;

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Counter file {path} is corrupt: {content:?}")]
    Corrupt { path: String, content: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
