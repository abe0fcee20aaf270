//! Errors for repository operations that enforce membership rules.

use domain::services::MembershipError;
use thiserror::Error;

/// Failure of a transactional repository operation.
///
/// Rule violations are detected inside the transaction, after the rows they
/// depend on are locked, and abort it like any database error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Rule(#[from] MembershipError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Returns true if the error is a unique constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}

/// Maps a unique violation to a rule error, passing anything else through.
pub(crate) fn on_unique_violation(err: sqlx::Error, rule: MembershipError) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Rule(rule)
    } else {
        StoreError::Database(err)
    }
}
