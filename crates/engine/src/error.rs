//! The module contains the errors the engine can throw.
//!
//! Every public operation reports one of these outcomes; the HTTP layer
//! maps them to distinct status codes.
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed or missing input, rejected before touching any state.
    #[error("validation: {0}")]
    Validation(String),
    /// A referenced entity does not exist (or is not visible to the caller).
    #[error("not found: {0}")]
    NotFound(String),
    /// The requested transition is not permitted from the current status.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// A business-rule lock: closed-emission guard or a concurrent
    /// modification detected by the version check.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The caller's role may not perform this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl EngineError {
    /// Stable machine-readable code for the API error body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::InvalidState(_) => "invalid_state",
            Self::Conflict(_) => "conflict",
            Self::Forbidden(_) => "forbidden",
            Self::Database(_) => "internal",
        }
    }
}
