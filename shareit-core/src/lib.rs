pub mod booking;
pub mod items;
pub mod memory;
pub mod models;
pub mod repository;
pub mod requests;
pub mod users;
pub mod validation;

pub use booking::BookingService;
pub use items::ItemService;
pub use memory::MemoryDatabase;
pub use repository::{Database, UnitOfWork};
pub use requests::RequestService;
pub use users::UserService;

use chrono::NaiveDateTime;
use shareit_shared::PageError;

/// Why a `NotFound` was raised. Callers only ever see "not found"; the
/// reason exists so logs can tell a missing row from a hidden one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    Missing,
    OwnershipDenied,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Incorrect endTime parameter: start {start} is not before end {end}")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("{message}")]
    NotFound {
        message: String,
        reason: NotFoundReason,
    },

    #[error("{0}")]
    NotAvailable(String),

    #[error("Unknown state: {0}")]
    UnsupportedState(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    StoreError(String),
}

impl CoreError {
    pub fn missing(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            reason: NotFoundReason::Missing,
        }
    }

    pub fn denied(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            reason: NotFoundReason::OwnershipDenied,
        }
    }

    pub fn user_not_found(user_id: i64) -> Self {
        Self::missing(format!("User with id={} not found", user_id))
    }
}

impl From<PageError> for CoreError {
    fn from(err: PageError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
