/// Application use-cases
///
/// Thin orchestration between the HTTP layer and the repositories. Every
/// write is validated here first, and task access is scoped to the acting
/// user: a task owned by someone else is indistinguishable from a missing
/// one.
///
/// - [`task::TaskUsecase`]: task CRUD for an authenticated actor
/// - [`user::UserUsecase`]: registration and login

use validator::ValidationErrors;

use crate::auth::{jwt::JwtError, password::PasswordError};
use crate::repository::RepositoryError;

pub mod task;
pub mod user;

pub use task::{NewTaskInput, TaskQuery, TaskUsecase};
pub use user::{Credentials, UserUsecase};

pub type UsecaseResult<T> = Result<T, UsecaseError>;

/// Use-case failures, one variant per client-visible outcome
#[derive(Debug, thiserror::Error)]
pub enum UsecaseError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{0}")]
    Conflict(String),

    /// Unknown email or wrong password; deliberately not distinguished
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),
}

impl From<RepositoryError> for UsecaseError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => UsecaseError::NotFound { entity, id },
            RepositoryError::Conflict(what) => UsecaseError::Conflict(what),
            other => UsecaseError::Repository(other),
        }
    }
}
