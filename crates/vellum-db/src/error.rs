use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found")]
    NotFound,
    /// A UNIQUE or PRIMARY KEY constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    /// A stored value no longer parses into its domain type.
    #[error("corrupt value: {0}")]
    Corrupt(String),
    #[error("DB lock poisoned: {0}")]
    LockPoisoned(String),
    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),
}

impl DbError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ffi_err, msg) = &err {
            let unique = ffi_err.code == ErrorCode::ConstraintViolation
                && (ffi_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || ffi_err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY);
            if unique {
                return DbError::Conflict(msg.clone().unwrap_or_else(|| "unique constraint".into()));
            }
        }
        DbError::Sqlite(err)
    }
}
