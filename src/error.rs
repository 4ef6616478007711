//! Ledger-wide error taxonomy. Transport-independent: every component returns
//! `LedgerError` and the transport layer (out of scope here) maps variants to
//! status codes.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: actor lacks the required role")]
    Forbidden,

    #[error("unauthorized: no authenticated principal")]
    Unauthorized,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => LedgerError::NotFound("row not found".to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                LedgerError::Duplicate(db_err.message().to_string())
            }
            other => LedgerError::Internal(other.to_string()),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Helper constructors used throughout the services so call sites read as
/// `LedgerError::account_not_found(id)` rather than ad-hoc string formatting.
impl LedgerError {
    pub fn account_not_found(account_id: Uuid) -> Self {
        LedgerError::NotFound(format!("account {account_id} not found"))
    }

    pub fn journal_not_found(journal_id: Uuid) -> Self {
        LedgerError::NotFound(format!("journal {journal_id} not found"))
    }
}
