use thiserror::Error;
use vellum_db::DbError;
use vellum_types::models::{Permission, Role};

pub type Result<T> = std::result::Result<T, VellumError>;

/// Why the access gate refused an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("not a member of the owning group")]
    NoMembership,
    #[error("role {role} does not grant {required}")]
    InsufficientRole { role: Role, required: Permission },
    #[error("group is not active")]
    GroupInactive,
    #[error("user is not active")]
    UserInactive,
}

#[derive(Debug, Error)]
pub enum VellumError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("forbidden: {0}")]
    Forbidden(DenyReason),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    /// Concurrent writers kept taking the next number until the retry budget
    /// ran out.
    #[error("version allocation failed after {attempts} attempts")]
    AllocationFailed { attempts: u32 },
    #[error("storage error: {0}")]
    Storage(DbError),
}

/// Coarse error category, for callers that map errors onto a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Forbidden,
    InvalidState,
    ValidationFailed,
    Internal,
}

impl VellumError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VellumError::NotFound(_) => ErrorKind::NotFound,
            VellumError::Conflict(_) | VellumError::AllocationFailed { .. } => ErrorKind::Conflict,
            VellumError::Forbidden(_) => ErrorKind::Forbidden,
            VellumError::InvalidState(_) => ErrorKind::InvalidState,
            VellumError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            VellumError::Storage(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn archived() -> Self {
        VellumError::InvalidState("template is archived".into())
    }
}

impl From<DbError> for VellumError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => VellumError::NotFound("record"),
            DbError::Conflict(msg) => VellumError::Conflict(msg),
            other => VellumError::Storage(other),
        }
    }
}
