/// PostgreSQL repositories
///
/// Rows are read into dedicated `*Row` structs and converted into domain
/// models with explicit `From` impls, so the column list and the domain
/// shape can evolve independently.
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::db::pool::{create_pool, DatabaseConfig};
/// use tasknest_shared::repository::{PgTaskRepository, TaskRepository};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let repo = PgTaskRepository::new(pool);
/// let task = repo.get_by_id(1).await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use super::{RepositoryError, RepositoryResult, TaskRepository, UserRepository};
use crate::models::{
    page::Pagination,
    task::{NewTask, Task, TaskFilter},
    user::{NewUser, User},
};

const TASK_COLUMNS: &str = "id, title, done, created_by, updated_by, created_at, updated_at";

const USER_COLUMNS: &str =
    "id, email, password_hash, created_by, updated_by, created_at, updated_at";

/// Storage row for `tasks`
#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    done: bool,
    created_by: i64,
    updated_by: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            title: row.title,
            done: row.done,
            created_by: row.created_by,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Storage row for `users`
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    created_by: Option<i64>,
    updated_by: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            created_by: row.created_by,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Escapes LIKE metacharacters so user input only ever matches literally
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// sqlx-backed task repository
#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, task: NewTask) -> RepositoryResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (title, done, created_by, updated_by)
            VALUES ($1, $2, $3, $3)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(task.title)
        .bind(task.done)
        .bind(task.created_by)
        .fetch_one(&self.pool)
        .await?;

        debug!(task_id = row.id, owner = row.created_by, "Inserted task");
        Ok(row.into())
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::from)
            .ok_or(RepositoryError::NotFound { entity: "task", id })
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        pagination: Pagination,
    ) -> RepositoryResult<(Vec<Task>, i64)> {
        // NULL parameters disable their predicate.
        const WHERE_CLAUSE: &str = r#"
            WHERE ($1::BIGINT IS NULL OR created_by = $1)
              AND ($2::TEXT IS NULL OR title ILIKE $2 ESCAPE '\')
              AND ($3::BOOLEAN IS NULL OR done = $3)
        "#;

        let title = filter.title.as_deref().map(like_pattern);

        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks {WHERE_CLAUSE} ORDER BY id LIMIT $4 OFFSET $5"
        ))
        .bind(filter.owner)
        .bind(title.as_deref())
        .bind(filter.done)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM tasks {WHERE_CLAUSE}"))
                .bind(filter.owner)
                .bind(title.as_deref())
                .bind(filter.done)
                .fetch_one(&self.pool)
                .await?;

        Ok((rows.into_iter().map(Task::from).collect(), total))
    }

    async fn update(&self, task: &Task) -> RepositoryResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks
            SET title = $2,
                done = $3,
                updated_by = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(task.id)
        .bind(&task.title)
        .bind(task.done)
        .bind(task.updated_by)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::from).ok_or(RepositoryError::NotFound {
            entity: "task",
            id: task.id,
        })
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "task", id });
        }
        Ok(())
    }

    async fn delete_all(&self, owner: Option<i64>) -> RepositoryResult<Vec<Task>> {
        // A single statement, so the snapshot is exactly what was removed.
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            DELETE FROM tasks
            WHERE ($1::BIGINT IS NULL OR created_by = $1)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let mut removed: Vec<Task> = rows.into_iter().map(Task::from).collect();
        removed.sort_by_key(|t| t.id);
        Ok(removed)
    }

    async fn ping(&self) -> RepositoryResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}

/// sqlx-backed user repository
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}
