//! Error types for the ALLOT system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AllotError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Illegal state: {message}")]
    IllegalState { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Malformed product attribute {key}: {value:?}")]
    MalformedAttribute { key: String, value: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AllotResult<T> = Result<T, AllotError>;
