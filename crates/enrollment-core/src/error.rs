//! Error types for enrollment-core

use thiserror::Error;

/// Result type alias for enrollment operations
pub type Result<T> = std::result::Result<T, EnrollmentError>;

/// Main error type for enrollment operations
#[derive(Error, Debug)]
pub enum EnrollmentError {
    /// Persistence-related errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A required field was absent or blank
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),
}

impl EnrollmentError {
    /// True when the underlying storage rejected the write on a constraint
    /// (unique email, foreign key, check).
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            EnrollmentError::Persistence(PersistenceError::Constraint(_))
        )
    }
}

/// Persistence-specific errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Storage constraint violated (UNIQUE, FOREIGN KEY, CHECK, NOT NULL)
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Stored schema cannot be used by this build
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Profile name does not match any known profile
    #[error("Unknown configuration profile: {0}")]
    UnknownProfile(String),

    /// Connection URI scheme has no backend in this build
    #[error("Unsupported database backend: {0}")]
    UnsupportedBackend(String),

    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Settings text could not be parsed or rendered
    #[error("Parse error: {0}")]
    Parse(String),

    /// Settings file could not be read
    #[error("Cannot read settings file: {0}")]
    Read(String),
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
            if failure.code == rusqlite::ErrorCode::ConstraintViolation {
                let detail = message.clone().unwrap_or_else(|| failure.to_string());
                return PersistenceError::Constraint(detail);
            }
        }
        PersistenceError::Database(err.to_string())
    }
}

impl From<r2d2::Error> for PersistenceError {
    fn from(err: r2d2::Error) -> Self {
        PersistenceError::Pool(err.to_string())
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Io(err.to_string())
    }
}

impl From<rusqlite::Error> for EnrollmentError {
    fn from(err: rusqlite::Error) -> Self {
        EnrollmentError::Persistence(PersistenceError::from(err))
    }
}

impl From<r2d2::Error> for EnrollmentError {
    fn from(err: r2d2::Error) -> Self {
        EnrollmentError::Persistence(PersistenceError::from(err))
    }
}
