//! Error types for scoperem operations.

use thiserror::Error;

/// Errors that can occur while configuring or running a rewrite.
///
/// The transforms themselves are fail-soft; these only surface from
/// configuration and I/O boundaries.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("breakpoints must be strictly ascending: entry {index} ({current}) follows {previous}")]
    UnsortedBreakpoints {
        index: usize,
        previous: f64,
        current: f64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
