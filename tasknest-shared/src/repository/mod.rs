/// Persistence boundary for tasks and users
///
/// The repository traits are the only way the rest of the system touches
/// storage. Two implementations are provided:
///
/// - [`postgres`]: sqlx-backed, explicit row structs mapped into domain models
/// - [`memory`]: `RwLock`-guarded maps, for tests and local experiments
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasknest_shared::models::task::NewTask;
/// use tasknest_shared::repository::{memory::InMemoryTaskRepository, TaskRepository};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repo: Arc<dyn TaskRepository> = Arc::new(InMemoryTaskRepository::new());
/// let task = repo
///     .create(NewTask { title: "buy milk".into(), done: false, created_by: 7 })
///     .await?;
/// assert_eq!(repo.get_by_id(task.id).await?.title, "buy milk");
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;

use crate::models::{
    page::Pagination,
    task::{NewTask, Task, TaskFilter},
    user::{NewUser, User},
};

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryTaskRepository, InMemoryUserRepository};
pub use postgres::{PgTaskRepository, PgUserRepository};

/// Repository result type alias
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage errors surfaced to the use-case layer
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No row with the given identifier
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Unique constraint violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Connection, protocol or other database failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return RepositoryError::Conflict(constraint);
            }
        }
        RepositoryError::Database(err)
    }
}

/// Task storage operations
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a task and returns it with its generated id and timestamps
    async fn create(&self, task: NewTask) -> RepositoryResult<Task>;

    /// Loads one task
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Task>;

    /// Returns one page of matching tasks, ordered by id, plus the total match count
    async fn list(
        &self,
        filter: &TaskFilter,
        pagination: Pagination,
    ) -> RepositoryResult<(Vec<Task>, i64)>;

    /// Writes the mutable fields of `task` by primary key
    async fn update(&self, task: &Task) -> RepositoryResult<Task>;

    /// Removes exactly one task
    async fn delete(&self, id: i64) -> RepositoryResult<()>;

    /// Removes every task (of `owner`, when given) and returns what was removed
    async fn delete_all(&self, owner: Option<i64>) -> RepositoryResult<Vec<Task>>;

    /// Verifies the backing store is reachable
    async fn ping(&self) -> RepositoryResult<()>;
}

/// User storage operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user; `Conflict` when the email is taken
    async fn create(&self, user: NewUser) -> RepositoryResult<User>;

    /// Case-insensitive lookup by email
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
}
