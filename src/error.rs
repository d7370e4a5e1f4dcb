//! Error types for the engagement vision library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// A geometric quantity could not be computed (coincident or parallel points)
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A required external resource (recorded stream, landmark source) is missing
    #[error("Input unavailable: {0}")]
    InputUnavailable(String),

    /// A record of the observation stream could not be decoded
    #[error("Replay error at line {line}: {message}")]
    Replay {
        /// 1-based line number of the offending record
        line: usize,
        /// Decoder message
        message: String,
    },

    /// Event publication failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Optical-flow collaborator failed
    #[error("Flow error: {0}")]
    FlowError(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

impl Error {
    /// True for errors that only invalidate the current face's signals
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateGeometry(_))
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
