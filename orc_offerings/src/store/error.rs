//! Error types for store operations

use crate::logging::codes::{self, Code};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Offering already exists for course {course} in {term} at hour '{hour}'")]
    DuplicateOffering {
        course: u64,
        term: String,
        hour: String,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::NotFound(_) => codes::store::RECORD_NOT_FOUND,
            Self::DuplicateOffering { .. } => codes::store::DUPLICATE_OFFERING,
            Self::Unavailable(_) => codes::store::STORE_UNAVAILABLE,
            Self::LockPoisoned(_) | Self::Internal(_) => codes::system::INTERNAL_ERROR,
        }
    }
}

impl From<String> for StoreError {
    fn from(s: String) -> Self {
        StoreError::Internal(s)
    }
}

impl From<&str> for StoreError {
    fn from(s: &str) -> Self {
        StoreError::Internal(s.to_string())
    }
}
