//! Error types for Flowscope

use thiserror::Error;

/// Core errors that can occur in Flowscope
#[derive(Debug, Error)]
pub enum Error {
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Search index connection and query errors.
///
/// Clone is required because the feed keeps the last fetch error around
/// for consumers to display while the accumulated pages stay valid.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    #[error("Index unreachable at {url}")]
    Unreachable { url: String },

    #[error("Index returned error: {message}")]
    ApiError { message: String },

    #[error("Index request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Result type alias for Flowscope operations
pub type Result<T> = std::result::Result<T, Error>;

impl IndexError {
    /// Get an HTTP-friendly error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "index_unreachable",
            Self::ApiError { .. } => "index_api_error",
            Self::Timeout { .. } => "index_timeout",
            Self::ParseError(_) => "index_parse_error",
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unreachable { .. } | Self::Timeout { .. } => 503,
            Self::ApiError { .. } => 502,
            Self::ParseError(_) => 502,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_error_codes() {
        let err = IndexError::Timeout { secs: 30 };
        assert_eq!(err.error_code(), "index_timeout");
        assert_eq!(err.status_code(), 503);

        let err = IndexError::ApiError {
            message: "bad query".into(),
        };
        assert_eq!(err.error_code(), "index_api_error");
        assert_eq!(err.status_code(), 502);
    }
}
