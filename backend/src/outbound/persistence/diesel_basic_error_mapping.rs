//! Shared Diesel error mapping for the booking repositories.

use tracing::debug;

use crate::domain::ports::PersistenceError;

use super::pool::PoolError;

/// Map pool checkout/build failures to a connection error.
pub fn map_pool_error(error: PoolError) -> PersistenceError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    PersistenceError::connection(message)
}

/// Map common Diesel error variants into persistence errors.
///
/// Row-level `NotFound` is reported as a query error here; callers that look
/// up a specific row use [`map_diesel_error_for`] instead.
pub fn map_diesel_error(error: diesel::result::Error) -> PersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => PersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => PersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PersistenceError::connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            PersistenceError::query("referenced row does not exist")
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
            PersistenceError::query("row violates a table constraint")
        }
        _ => PersistenceError::query("database error"),
    }
}

/// Like [`map_diesel_error`], but `NotFound` names the missing `entity`.
pub fn map_diesel_error_for(
    entity: impl Into<String>,
) -> impl FnOnce(diesel::result::Error) -> PersistenceError {
    let entity = entity.into();
    move |error| match error {
        diesel::result::Error::NotFound => PersistenceError::not_found(entity),
        other => map_diesel_error(other),
    }
}
