use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for credit-entry operations
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<DieselError> for EntryError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => EntryError::NotFound("Record not found".to_string()),
            _ => EntryError::DatabaseError(err.to_string()),
        }
    }
}
