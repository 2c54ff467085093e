//! Application-level errors.
//!
//! Handlers translate the layers below into one enum so callers match on a
//! single error type:
//!
//! | source                     | variant                     |
//! |----------------------------|-----------------------------|
//! | command shape (validator)  | `Validation`                |
//! | domain rules               | `Domain`                    |
//! | missing aggregate          | `NotFound`                  |
//! | revision check failed      | `Conflict`                  |
//! | cancelled token            | `Cancelled`                 |
//! | any other storage failure  | `Store`                     |

use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use shopforge_core::DomainError;
use shopforge_infra::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("the {resource} with id '{id}' was not found")]
    NotFound { resource: &'static str, id: Uuid },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("invalid command: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("concurrent modification: {0}")]
    Conflict(String),

    #[error("operation was cancelled")]
    Cancelled,

    #[error("storage failure: {0}")]
    Store(String),
}

impl AppError {
    pub fn not_found(resource: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { .. } => Self::Conflict(err.to_string()),
            StoreError::Cancelled => Self::Cancelled,
            other => Self::Store(other.to_string()),
        }
    }
}
