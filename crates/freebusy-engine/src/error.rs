//! Error types for free/busy computation.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FreeBusyError {
    /// A busy interval ends before it starts. `index` is its position in the
    /// caller's input slice.
    #[error("Malformed busy interval #{index}: start {start} is after end {end}")]
    MalformedInterval {
        index: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

pub type Result<T> = std::result::Result<T, FreeBusyError>;
