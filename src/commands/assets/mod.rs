//! Bulk asset ingestion commands and their per-item outcome reporting.

pub mod bulk_create_assets_command;
pub mod bulk_update_assets_command;

pub use bulk_create_assets_command::{BulkCreateAssetsCommand, NewAssetInput};
pub use bulk_update_assets_command::{AssetUpdateInput, BulkUpdateAssetsCommand};

use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidationErrors;

use crate::errors::ServiceError;

/// Classification of a single failed batch item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Malformed or missing required fields on the item itself.
    Validation,
    /// A referenced entity (PO, model, vendor, OS, user, the asset id on
    /// updates) does not exist.
    MissingReference,
    /// Store-level uniqueness/integrity violation.
    Integrity,
    /// Anything else; recorded with full context but not classified.
    Unexpected,
}

/// One failed item, isolated from its siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ItemFailure {
    pub kind: FailureKind,
    pub field: Option<String>,
    pub message: String,
}

impl ItemFailure {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Validation,
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn missing_reference(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::MissingReference,
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn from_service_error(err: ServiceError) -> Self {
        match err {
            ServiceError::FieldValidation { field, message } => Self {
                kind: FailureKind::Validation,
                field: Some(field),
                message,
            },
            ServiceError::InvalidStatus(message) => Self {
                kind: FailureKind::Validation,
                field: Some("status".to_string()),
                message,
            },
            ServiceError::ValidationError(message) | ServiceError::InvalidInput(message) => Self {
                kind: FailureKind::Validation,
                field: None,
                message,
            },
            ServiceError::NotFound(message) => Self {
                kind: FailureKind::MissingReference,
                field: None,
                message,
            },
            ServiceError::IntegrityViolation { field, message } => Self {
                kind: FailureKind::Integrity,
                field: Some(field),
                message,
            },
            other => Self {
                kind: FailureKind::Unexpected,
                field: None,
                message: other.to_string(),
            },
        }
    }
}

impl From<DbErr> for ItemFailure {
    fn from(err: DbErr) -> Self {
        Self::from_service_error(ServiceError::from_db_err(err))
    }
}

/// Extracts the first field/message pair from validator output so a batch
/// item can report one concrete offending field.
pub(crate) fn first_validation_failure(errors: &ValidationErrors) -> ItemFailure {
    for (field, field_errors) in errors.field_errors() {
        if let Some(error) = field_errors.first() {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("invalid value for '{}'", field));
            return ItemFailure::validation(field.to_string(), message);
        }
    }
    ItemFailure {
        kind: FailureKind::Validation,
        field: None,
        message: errors.to_string(),
    }
}

/// Outcome of one batch item, success or failure, at its original index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub index: usize,
    /// Serial number if present, else name, else the batch index.
    pub identifier: String,
    pub asset_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ItemFailure>,
}

impl ItemOutcome {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Whole-batch classification; callers map this to a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchDisposition {
    AllSucceeded,
    PartialSuccess,
    AllFailed,
}

/// Advisory capacity information for PO-scoped batches. Never a rejection
/// rule: a batch that exceeds `remaining_before` still runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityNote {
    pub total_devices: i32,
    pub linked_before: u64,
    pub remaining_before: u64,
    pub requested: usize,
    pub can_create_more: bool,
}

/// Per-item outcome report for one bulk call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub disposition: BatchDisposition,
    pub results: Vec<ItemOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<CapacityNote>,
}

impl BatchOutcome {
    pub fn from_results(results: Vec<ItemOutcome>, capacity: Option<CapacityNote>) -> Self {
        let total = results.len();
        let succeeded = results.iter().filter(|r| r.succeeded()).count();
        let failed = total - succeeded;
        let disposition = if failed == 0 {
            BatchDisposition::AllSucceeded
        } else if succeeded == 0 {
            BatchDisposition::AllFailed
        } else {
            BatchDisposition::PartialSuccess
        };
        Self {
            total,
            succeeded,
            failed,
            disposition,
            results,
            capacity,
        }
    }
}

/// Identifier precedence for error reporting: serial number, else name,
/// else the item's position in the batch.
pub(crate) fn item_identifier(
    serial_number: Option<&str>,
    name: Option<&str>,
    index: usize,
) -> String {
    if let Some(serial) = serial_number.map(str::trim).filter(|s| !s.is_empty()) {
        return serial.to_string();
    }
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    format!("#{}", index)
}
