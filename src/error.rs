//! Centralized error type for the carve umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] carve_core::Error),

    #[cfg(feature = "sampler")]
    #[error("Sampler: {0}")]
    Sampler(#[from] carve_sampler::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
