//! Error types for Catalog-Store

use thiserror::Error;

/// Result type alias for Catalog-Store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Catalog-Store
#[derive(Error, Debug)]
pub enum Error {
    /// Page number outside `[1, last_page]`
    #[error("Page {page} is out of range (last page is {last_page})")]
    OutOfRange {
        /// Requested page number
        page: u32,
        /// Last page known at call time
        last_page: u32,
    },

    /// Remote catalog failures (transport, backend, decoding)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error only concerns the call that raised it and leaves
    /// the store untouched.
    pub fn is_local(&self) -> bool {
        matches!(self, Error::OutOfRange { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
