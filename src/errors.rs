use http::StatusCode;
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};

use crate::services::po_deletion::ConflictReport;

/// Simplified error structure handed to callers that shape transport
/// responses (HTTP routing itself lives outside this crate).
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status category (e.g., "Not Found", "Conflict", "Internal Server Error")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Additional error details (validation errors, blocking-asset reports)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        sea_orm::error::DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A batch-item field failed validation; carries the offending field.
    #[error("Validation error on '{field}': {message}")]
    FieldValidation { field: String, message: String },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Internal server error")]
    InternalServerError,

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Cascade deletion blocked by linked assets; carries the full report
    /// so callers can resolve each conflict rather than just seeing a count.
    #[error("Purchase order {} has {} asset(s) blocking deletion", .0.po_number, .0.blocking_assets.len())]
    DeletionConflict(ConflictReport),

    /// Store-level uniqueness violation mapped to the offending field where
    /// the underlying cause could be pattern-matched.
    #[error("Duplicate value for '{field}': {message}")]
    IntegrityViolation { field: String, message: String },

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

pub trait IntoDbErr {
    fn into_db_err(self) -> DbErr;
}

impl IntoDbErr for DbErr {
    fn into_db_err(self) -> DbErr {
        self
    }
}

impl IntoDbErr for String {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self)
    }
}

impl IntoDbErr for &str {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self.to_string())
    }
}

impl ServiceError {
    /// Generic constructor that normalizes any supported database error input.
    pub fn db_error<E: IntoDbErr>(error: E) -> Self {
        ServiceError::DatabaseError(error.into_db_err())
    }

    /// Maps a store-level error onto the error taxonomy, recognizing
    /// uniqueness violations on the columns this crate owns. Anything the
    /// pattern match cannot classify stays a `DatabaseError`.
    pub fn from_db_err(err: DbErr) -> Self {
        let text = err.to_string().to_lowercase();
        if text.contains("unique") || text.contains("duplicate") {
            let field = if text.contains("po_number") {
                "po_number"
            } else if text.contains("serial_number") {
                "serial_number"
            } else if text.contains("asset_code") {
                "asset_code"
            } else {
                return ServiceError::IntegrityViolation {
                    field: "unknown".to_string(),
                    message: "uniqueness constraint violated".to_string(),
                };
            };
            return ServiceError::IntegrityViolation {
                field: field.to_string(),
                message: format!("value already exists ({})", field),
            };
        }
        ServiceError::DatabaseError(err)
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_)
            | Self::FieldValidation { .. }
            | Self::InvalidOperation(_)
            | Self::InvalidInput(_)
            | Self::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            Self::EventError(_)
            | Self::InternalError(_)
            | Self::InternalServerError
            | Self::MigrationError(_)
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Conflict(_) | Self::DeletionConflict(_) | Self::IntegrityViolation { .. } => {
                StatusCode::CONFLICT
            }
        }
    }

    /// Returns the error message suitable for transport responses.
    /// Internal errors return generic messages to avoid leaking details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::Other(_) | Self::InternalServerError => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Structured payload accompanying the message, where one exists.
    pub fn response_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::DeletionConflict(report) => serde_json::to_value(report).ok(),
            _ => None,
        }
    }

    /// Builds the response structure callers serialize at the transport edge.
    pub fn to_response(&self) -> ErrorResponse {
        let status = self.status_code();
        ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: self.response_details(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_field_specific_integrity_error() {
        let err = DbErr::Custom("UNIQUE constraint failed: assets.serial_number".to_string());
        match ServiceError::from_db_err(err) {
            ServiceError::IntegrityViolation { field, .. } => {
                assert_eq!(field, "serial_number");
            }
            other => panic!("expected IntegrityViolation, got {other:?}"),
        }
    }

    #[test]
    fn unclassified_db_error_stays_database_error() {
        let err = DbErr::Custom("connection reset".to_string());
        assert!(matches!(
            ServiceError::from_db_err(err),
            ServiceError::DatabaseError(_)
        ));
    }

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ServiceError::NotFound("po".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::InvalidStatus("BOGUS".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
