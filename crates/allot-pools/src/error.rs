//! Pool engine error types.

use allot_core::error::AllotError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    /// A master pool cannot be rooted in a derived source: the
    /// subscription itself is needed to re-derive it later. This is a
    /// caller invariant violation, not a data-quality issue.
    #[error("cannot create master pool from a derived source")]
    MasterFromDerivedSource,

    /// The operation only applies to stack-derived pools.
    #[error("pool {pool_id} is not stack-derived")]
    NotStackDerived { pool_id: String },

    #[error("malformed attribute {key}: {value:?}")]
    MalformedAttribute { key: String, value: String },
}

impl From<PoolError> for AllotError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::MasterFromDerivedSource | PoolError::NotStackDerived { .. } => {
                AllotError::IllegalState {
                    message: err.to_string(),
                }
            }
            PoolError::MalformedAttribute { key, value } => {
                AllotError::MalformedAttribute { key, value }
            }
        }
    }
}
