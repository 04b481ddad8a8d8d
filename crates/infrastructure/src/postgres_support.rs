use smartsales_core::AppError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Maps unique violations to a conflict and everything else to an internal error.
pub(crate) fn conflict_or_internal(error: sqlx::Error, conflict: &str, operation: &str) -> AppError {
    if has_code(&error, UNIQUE_VIOLATION) {
        return AppError::Conflict(conflict.to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

/// Maps foreign-key violations to a conflict and everything else to an internal error.
pub(crate) fn referenced_or_internal(
    error: sqlx::Error,
    conflict: &str,
    operation: &str,
) -> AppError {
    if has_code(&error, FOREIGN_KEY_VIOLATION) {
        return AppError::Conflict(conflict.to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

pub(crate) fn internal(operation: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |error| AppError::Internal(format!("failed to {operation}: {error}"))
}

fn has_code(error: &sqlx::Error, code: &str) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some(code)
    )
}
