//! Stable error codes for the command boundary.

use rusqlite::ffi;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    #[error("Migration failed: {0}")]
    MigrationFailure(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::DuplicateName(_) => "DUPLICATE_NAME",
            Self::MigrationFailure(_) => "MIGRATION_FAILURE",
            Self::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }

    pub fn to_serde(&self) -> AppErrorDto {
        AppErrorDto {
            code: self.code().to_string(),
            message: self.to_string(),
            details: None,
        }
    }

    /// Only startup can produce this; callers treat it as fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MigrationFailure(_))
    }
}

/// Constraint violations that slipped past the pre-checks keep their
/// taxonomy; anything else is reported without engine details.
impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref err, _) = e {
            match err.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE => {
                    return AppError::DuplicateName("name already in use".into());
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return AppError::NotFound("referenced row does not exist".into());
                }
                _ => {}
            }
        }
        log::error!("storage error: {}", e);
        AppError::StorageUnavailable("database operation failed".into())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        log::error!("connection pool error: {}", e);
        AppError::StorageUnavailable("no database connection available".into())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("malformed request: {}", e))
    }
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_serde().serialize(serializer)
    }
}

#[derive(Debug, Serialize)]
pub struct AppErrorDto {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(AppError::InvalidInput("x".into()).code(), "INVALID_INPUT");
        assert_eq!(AppError::NotFound("x".into()).code(), "NOT_FOUND");
        assert_eq!(AppError::DuplicateName("x".into()).code(), "DUPLICATE_NAME");
        assert_eq!(
            AppError::MigrationFailure("x".into()).code(),
            "MIGRATION_FAILURE"
        );
        assert_eq!(
            AppError::StorageUnavailable("x".into()).code(),
            "STORAGE_UNAVAILABLE"
        );
    }

    #[test]
    fn storage_errors_do_not_leak_engine_text() {
        let err: AppError = rusqlite::Error::InvalidColumnName("secret_col".into()).into();
        assert_eq!(err.code(), "STORAGE_UNAVAILABLE");
        assert!(!err.to_string().contains("secret_col"));
    }

    #[test]
    fn serializes_as_dto() {
        let json = serde_json::to_value(AppError::NotFound("account 7".into())).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Not found: account 7");
        assert!(json["details"].is_null());
    }

    #[test]
    fn only_migration_failure_is_fatal() {
        assert!(AppError::MigrationFailure("v2".into()).is_fatal());
        assert!(!AppError::StorageUnavailable("x".into()).is_fatal());
    }
}
