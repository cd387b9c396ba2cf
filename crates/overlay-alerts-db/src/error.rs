//! Error types for the database layer

use thiserror::Error;

/// Result type alias for store operations
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    /// `SQLite` error from the underlying driver
    #[error("SQLite error: {0}")]
    Sqlite(String),

    /// Record not found
    #[error("{entity} not found: {identifier}")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },

    /// Duplicate record
    #[error("{entity} already exists: {identifier}")]
    Duplicate {
        entity: &'static str,
        identifier: String,
    },

    /// Invalid argument
    #[error("Invalid {field}: {message}")]
    InvalidArgument {
        field: &'static str,
        message: String,
    },

    /// Schema creation error
    #[error("Schema error: {0}")]
    Schema(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DbError {
    /// Shorthand for [`DbError::NotFound`]
    #[must_use]
    pub fn not_found(entity: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            identifier: identifier.into(),
        }
    }

    /// Whether a retry on the next scheduled poll may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Sqlite(_))
    }
}

impl From<DbError> for overlay_alerts_core::Error {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, identifier } if entity == "Overlay" => {
                Self::OverlayNotFound(identifier)
            }
            DbError::NotFound { entity, identifier } if entity == "Alert" => {
                Self::AlertNotFound(identifier)
            }
            other => Self::Database(other.to_string()),
        }
    }
}
