//! Error types for Overlay Alerts

use thiserror::Error;

/// Result type alias for Overlay Alerts operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Overlay Alerts
#[derive(Debug, Error)]
pub enum Error {
    // ==========================================================================
    // Resource Not Found Errors
    // ==========================================================================
    #[error("Overlay not found: {0}")]
    OverlayNotFound(String),

    #[error("Alert not found: {0}")]
    AlertNotFound(String),

    // ==========================================================================
    // Validation Errors
    // ==========================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ==========================================================================
    // Store Boundary Errors
    // ==========================================================================
    /// A fetch against the backing store failed; the backlog stays unchanged
    /// and the next scheduled poll retries.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// An acknowledgement request failed; advancement is never blocked on it.
    #[error("Acknowledge failed: {0}")]
    Acknowledge(String),

    #[error("Database error: {0}")]
    Database(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ==========================================================================
    // Internal Errors
    // ==========================================================================
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error type string (for structured log fields)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::OverlayNotFound(_) | Self::AlertNotFound(_) => "NOT_FOUND",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::Fetch(_) => "FETCH_ERROR",
            Self::Acknowledge(_) => "ACK_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Io(_) => "OS_ERROR",
            Self::Serialization(_) => "TYPE_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::Internal(_) => "UNHANDLED_EXCEPTION",
        }
    }

    /// Returns whether the error is recoverable (can be retried on the next
    /// scheduled poll without operator intervention)
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            // User-correctable input issues
            Self::OverlayNotFound(_)
                | Self::AlertNotFound(_)
                | Self::InvalidArgument(_)
                | Self::MissingField(_)
                // Transient / retryable store traffic
                | Self::Fetch(_)
                | Self::Acknowledge(_)
                | Self::Database(_)
                | Self::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exhaustive test: every Error variant maps to the correct `error_type` string.
    #[test]
    fn test_error_type_mapping_exhaustive() {
        let cases: Vec<(Error, &str)> = vec![
            (Error::OverlayNotFound("x".into()), "NOT_FOUND"),
            (Error::AlertNotFound("x".into()), "NOT_FOUND"),
            (Error::InvalidArgument("x".into()), "INVALID_ARGUMENT"),
            (Error::MissingField("x".into()), "MISSING_FIELD"),
            (Error::Fetch("x".into()), "FETCH_ERROR"),
            (Error::Acknowledge("x".into()), "ACK_ERROR"),
            (Error::Database("x".into()), "DATABASE_ERROR"),
            (Error::Io(std::io::Error::other("x")), "OS_ERROR"),
            (Error::Cancelled, "CANCELLED"),
            (Error::Internal("x".into()), "UNHANDLED_EXCEPTION"),
        ];

        for (err, expected_type) in &cases {
            assert_eq!(
                err.error_type(),
                *expected_type,
                "Error {err:?} should map to {expected_type}"
            );
        }
    }

    #[test]
    fn test_recoverable_classification() {
        let recoverable = vec![
            Error::OverlayNotFound("x".into()),
            Error::AlertNotFound("x".into()),
            Error::InvalidArgument("x".into()),
            Error::MissingField("x".into()),
            Error::Fetch("x".into()),
            Error::Acknowledge("x".into()),
            Error::Database("x".into()),
            Error::Cancelled,
        ];
        for err in &recoverable {
            assert!(err.is_recoverable(), "Error {err:?} should be recoverable");
        }

        let non_recoverable = vec![
            Error::Io(std::io::Error::other("x")),
            Error::Internal("x".into()),
        ];
        for err in &non_recoverable {
            assert!(
                !err.is_recoverable(),
                "Error {err:?} should NOT be recoverable"
            );
        }
    }

    #[test]
    fn serde_json_errors_convert() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = parse_err.into();
        assert_eq!(err.error_type(), "TYPE_ERROR");
    }
}
