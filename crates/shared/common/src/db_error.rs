//! Persistence error translation.
//!
//! Storage failures are classified once, at the repository boundary.

use sea_orm::{DbErr, SqlErr};

use crate::error::{ClassifiedError, ErrorCode};

/// Unique constraints with a field-specific conflict message.
const KNOWN_UNIQUE_CONSTRAINTS: [(&str, &str); 2] = [
    ("uni_users_email", "A user with the same email already exists"),
    ("uni_users_username", "A user with the same username already exists"),
];

const GENERIC_CONFLICT: &str = "A user with similar details already exists";

/// Classify a storage error.
///
/// Unique violations become `UNIQUE_KEY_VIOLATION`, missing rows `NOT_FOUND`,
/// everything else `DATABASE_ERROR`.
pub fn classify_db_error(err: DbErr) -> ClassifiedError {
    if matches!(err, DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated) {
        return ErrorCode::NotFound.error().with_cause(err);
    }

    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => ErrorCode::UniqueKeyViolation
            .with_detail(conflict_message(&message))
            .with_cause(err),
        _ => ErrorCode::DatabaseError.error().with_cause(err),
    }
}

/// Conflict message for the constraint named in a driver message.
fn conflict_message(driver_message: &str) -> &'static str {
    KNOWN_UNIQUE_CONSTRAINTS
        .iter()
        .find(|(constraint, _)| driver_message.contains(constraint))
        .map(|(_, message)| *message)
        .unwrap_or(GENERIC_CONFLICT)
}

impl From<DbErr> for ClassifiedError {
    fn from(err: DbErr) -> Self {
        classify_db_error(err)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use super::*;

    #[test]
    fn test_known_constraints() {
        assert_eq!(
            conflict_message(r#"duplicate key value violates unique constraint "uni_users_email""#),
            "A user with the same email already exists"
        );
        assert_eq!(
            conflict_message(r#"duplicate key value violates unique constraint "uni_users_username""#),
            "A user with the same username already exists"
        );
        assert_eq!(
            conflict_message(r#"duplicate key value violates unique constraint "users_pkey""#),
            GENERIC_CONFLICT
        );
    }

    #[test]
    fn test_missing_record_is_not_found() {
        let err = classify_db_error(DbErr::RecordNotFound("users".into()));
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_other_failures_are_database_errors() {
        let err = classify_db_error(DbErr::Custom("connection reset".into()));

        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.details(), None::<&Value>);
    }
}
