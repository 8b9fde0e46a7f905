//! Error types for the compositing engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while composing a banner
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to initialize the engine
    #[error("Engine initialization failed: {0}")]
    InitializationError(String),

    /// A tier or ordinal position resolved to nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to retrieve an image over the network
    #[error("Unable to fetch {0}")]
    FetchError(String),

    /// Fetched bytes could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    /// The vector-to-bitmap conversion failed
    #[error("Rasterization failed: {0}")]
    RasterError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
