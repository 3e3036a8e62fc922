//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `YardError` as one
//! variant where configuration problems can surface.

use thiserror::Error;

/// The top-level error type for `yard-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum YardError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `yard-*` crates.
pub type YardResult<T> = Result<T, YardError>;
