//! Conversions from external infrastructure errors into domain errors.

use rusqlite::Error as SqlError;
use timetrace_domain::TimetraceError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub TimetraceError);

impl From<InfraError> for TimetraceError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TimetraceError> for InfraError {
    fn from(value: TimetraceError) -> Self {
        InfraError(value)
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        let mapped = match value {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        TimetraceError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        TimetraceError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        TimetraceError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        TimetraceError::Database("foreign key constraint violation".into())
                    }
                    _ => TimetraceError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                TimetraceError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                TimetraceError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                TimetraceError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                TimetraceError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidQuery => TimetraceError::Database("invalid SQL query".into()),
            other => TimetraceError::Database(other.to_string()),
        };
        InfraError(mapped)
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(TimetraceError::Database(format!("connection pool error: {value}")))
    }
}
