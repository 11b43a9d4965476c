//! Shared Diesel error mapping for the repositories in this module.
//!
//! Each repository passes its own port-error constructors so the mapping
//! stays in one place while the error types stay port-specific.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(super) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.into_message())
}

/// Name of the unique constraint a Diesel error violated, if any.
pub(super) fn unique_violation(error: &DieselError) -> Option<&str> {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(info.constraint_name().unwrap_or_default())
        }
        _ => None,
    }
}

/// Map common Diesel error variants into query/connection constructors.
pub(super) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            query("unique constraint violated")
        }
        _ => query("database error"),
    }
}

/// Convert a Diesel row count to the `u64` reported through ports.
pub(super) fn row_count(rows: usize) -> u64 {
    u64::try_from(rows).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(&'static str),
        Connection(String),
    }

    fn map(error: DieselError) -> Mapped {
        map_basic_diesel_error(error, Mapped::Query, |m| Mapped::Connection(m.to_owned()))
    }

    #[rstest]
    fn not_found_is_query_error() {
        assert_eq!(map(DieselError::NotFound), Mapped::Query("record not found"));
    }

    #[rstest]
    fn closed_connection_is_connection_error() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new(String::from("server closed the connection")),
        );
        assert_eq!(
            map(error),
            Mapped::Connection(String::from("database connection error"))
        );
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        let mapped = map_basic_pool_error(PoolError::checkout("timed out"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection(String::from("timed out")));
    }

    #[rstest]
    fn non_unique_errors_have_no_constraint() {
        assert!(unique_violation(&DieselError::NotFound).is_none());
    }
}
