//! Error types for SetuIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// SetuIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Requested data does not exist yet; retry on the next poll tick
    #[error("Not ready")]
    NotReady,

    /// Programming error upstream; fatal, never retried
    #[error("Precondition violated: {0}")]
    Precondition(&'static str),

    /// Incoming frame dimensions disagree with the established slot size
    #[error("Frame resolution {actual:?} does not match established {expected:?}")]
    ResolutionMismatch {
        /// Dimensions pinned by the first accepted frame (width, height)
        expected: (u32, u32),
        /// Dimensions of the offending frame (width, height)
        actual: (u32, u32),
    },

    /// Frame payload length inconsistent with its declared dimensions
    #[error("Frame payload is {actual} bytes, expected {expected}")]
    MalformedFrame {
        /// Byte count implied by width, height and modality
        expected: usize,
        /// Byte count actually delivered
        actual: usize,
    },

    /// Calibration did not complete within the deadline
    #[error("Calibration did not complete within {0:?}")]
    InitializationTimeout(std::time::Duration),

    /// Cancellation token tripped while waiting
    #[error("Cancelled")]
    Cancelled,

    /// Wire encode/decode failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Transport layer failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file parse error
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration file write error
    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}
