use chrono::NaiveDate;
use thiserror::Error;

use crate::models::RecordId;

/// Failures of the backing store. Never caused by caller input.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database path error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("{kind} {id} disappeared from the store")]
    Missing { kind: &'static str, id: RecordId },
}

/// Every recoverable failure a desk operation can report.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("end date {end} must be after start date {start}")]
    DateRangeInvalid { start: NaiveDate, end: NaiveDate },

    #[error("{entity} cannot move from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("cannot {action} {entity} {id} while it is {state}")]
    InvalidState {
        entity: &'static str,
        id: RecordId,
        state: String,
        action: &'static str,
    },

    #[error("room {room_id} is unavailable: {reason}")]
    RoomUnavailable { room_id: RecordId, reason: String },

    #[error("room {room_id} is referenced by an active booking")]
    RoomInUse { room_id: RecordId },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: RecordId },

    #[error("invoice {invoice_id} is already paid")]
    AlreadyPaid { invoice_id: RecordId },

    #[error("unsupported payment method: {0}")]
    InvalidMethod(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DeskError {
    pub fn validation(message: impl Into<String>) -> Self {
        DeskError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: RecordId) -> Self {
        DeskError::NotFound { entity, id }
    }

    pub fn invalid_transition(
        entity: &'static str,
        from: impl ToString,
        to: impl ToString,
    ) -> Self {
        DeskError::InvalidTransition {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn invalid_state(
        entity: &'static str,
        id: RecordId,
        state: impl ToString,
        action: &'static str,
    ) -> Self {
        DeskError::InvalidState {
            entity,
            id,
            state: state.to_string(),
            action,
        }
    }

    pub fn room_unavailable(room_id: RecordId, reason: impl Into<String>) -> Self {
        DeskError::RoomUnavailable {
            room_id,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DeskError::Validation(_) => "validation_error",
            DeskError::DateRangeInvalid { .. } => "date_range_invalid",
            DeskError::InvalidTransition { .. } => "invalid_transition",
            DeskError::InvalidState { .. } => "invalid_state",
            DeskError::RoomUnavailable { .. } => "room_unavailable",
            DeskError::RoomInUse { .. } => "room_in_use",
            DeskError::NotFound { .. } => "not_found",
            DeskError::AlreadyPaid { .. } => "already_paid",
            DeskError::InvalidMethod(_) => "invalid_method",
            DeskError::Store(_) => "store_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;

/// Validate that a required string is non-empty after trimming.
pub fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DeskError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}
