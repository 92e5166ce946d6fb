//! Error types for carve-core.

use thiserror::Error;

/// Error type for carve-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid slice table: {0}")]
    InvalidSliceTable(String),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
