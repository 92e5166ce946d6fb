//! Error types.

use thiserror::Error;

/// Error type.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File extension is not on the allow-list.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoder produced no usable audio.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Encoder failed.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Resampling error.
    #[error("Resampling error: {0}")]
    Resample(String),

    /// Butler error.
    #[error("Butler error: {0}")]
    Butler(String),

    /// Core error.
    #[error(transparent)]
    Core(#[from] carve_core::Error),

    /// Hound error.
    #[error("Hound error: {0}")]
    HoundError(#[from] hound::Error),
}

impl From<symphonia::core::errors::Error> for Error {
    fn from(e: symphonia::core::errors::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

impl From<rubato::ResamplerConstructionError> for Error {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        Error::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for Error {
    fn from(e: rubato::ResampleError) -> Self {
        Error::Resample(e.to_string())
    }
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
