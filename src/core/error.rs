//! Error types for vigil.

use thiserror::Error;

/// Result type alias for vigil operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vigil operations.
///
/// The decision engines themselves never surface these: a failed or empty
/// metric query degrades to zero event counts inside the burn-rate engine,
/// and unknown lookups are signalled with `None`. The variants here exist
/// for `MetricQuery` implementations to report what went wrong before the
/// engine swallows it.
#[derive(Error, Debug)]
pub enum Error {
    // Metric backend errors
    #[error("metric query failed: {0}")]
    MetricQueryFailed(String),

    #[error("metric query returned no data: {0}")]
    MetricQueryEmpty(String),

    #[error("metric backend unreachable: {0}")]
    BackendUnreachable(String),

    // Serialization errors
    #[error("serialization error: {0}")]
    SerializationError(String),

    // Generic errors
    #[error("internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MetricQueryFailed("timeout after 5s".to_string());
        assert_eq!(err.to_string(), "metric query failed: timeout after 5s");
    }

    #[test]
    fn test_serde_json_conversion() {
        let bad = serde_json::from_str::<serde_json::Value>("not json");
        let err: Error = bad.unwrap_err().into();
        assert!(matches!(err, Error::SerializationError(_)));
    }
}
