//! Error types for the face overlay library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Asset loading or instantiation failed
    #[error("Asset load error: {0}")]
    AssetLoad(String),

    /// Manifest entry refers to an asset that does not exist
    #[error("Asset unavailable: {0}")]
    AssetUnavailable(String),

    /// No accessory with the given id exists in the manifest
    #[error("Unknown accessory: {0}")]
    UnknownAccessory(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Recorded tracker session could not be parsed
    #[error("Replay error: {0}")]
    ReplayError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
