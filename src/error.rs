use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::utils::db_utils::{is_deadlock, is_duplicate_key, is_lock_wait_timeout};

/// Failure taxonomy of the leave ledger.
///
/// Every variant except `Transaction` is raised before any write reaches the
/// database, so the caller can rely on "error means nothing changed".
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    /// Database failure mid-transaction; the transaction was rolled back.
    #[display(fmt = "transaction failed: {}", _0)]
    Transaction(String),
}

impl std::error::Error for LedgerError {}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        LedgerError::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        LedgerError::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        LedgerError::Forbidden(msg.into())
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        if is_lock_wait_timeout(&e) || is_deadlock(&e) {
            tracing::warn!(error = %e, "Ledger transaction lost a lock race, safe to retry");
            return LedgerError::Transaction("lock contention, retry the action".to_string());
        }
        if is_duplicate_key(&e) {
            tracing::warn!(error = %e, "Ledger write hit a key constraint");
            return LedgerError::Conflict("Record already exists".to_string());
        }
        tracing::error!(error = %e, "Ledger transaction failed");
        LedgerError::Transaction(e.to_string())
    }
}

impl ResponseError for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::Conflict(_) => StatusCode::CONFLICT,
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Forbidden(_) => StatusCode::FORBIDDEN,
            LedgerError::Transaction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // details stay in the logs
            LedgerError::Transaction(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
