/// In-memory repositories
///
/// Behave like the Postgres implementations (generated ids, ordering by id,
/// case-insensitive email uniqueness) without a database. Handles are cheap
/// to clone and share the same underlying store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{RepositoryError, RepositoryResult, TaskRepository, UserRepository};
use crate::models::{
    page::Pagination,
    task::{NewTask, Task, TaskFilter},
    user::{NewUser, User},
};

#[derive(Debug, Default)]
struct TaskStore {
    last_id: i64,
    rows: BTreeMap<i64, Task>,
}

/// Task repository backed by an ordered map
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    store: Arc<RwLock<TaskStore>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks
    pub async fn len(&self) -> usize {
        self.store.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: NewTask) -> RepositoryResult<Task> {
        let mut store = self.store.write().await;
        store.last_id += 1;

        let now = Utc::now();
        let task = Task {
            id: store.last_id,
            title: task.title,
            done: task.done,
            created_by: task.created_by,
            updated_by: task.created_by,
            created_at: now,
            updated_at: now,
        };
        store.rows.insert(task.id, task.clone());

        Ok(task)
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Task> {
        self.store
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound { entity: "task", id })
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        pagination: Pagination,
    ) -> RepositoryResult<(Vec<Task>, i64)> {
        let store = self.store.read().await;
        let matching: Vec<&Task> = store.rows.values().filter(|t| filter.matches(t)).collect();
        let total = matching.len() as i64;

        let page = matching
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn update(&self, task: &Task) -> RepositoryResult<Task> {
        let mut store = self.store.write().await;
        let stored = store.rows.get_mut(&task.id).ok_or(RepositoryError::NotFound {
            entity: "task",
            id: task.id,
        })?;

        stored.title = task.title.clone();
        stored.done = task.done;
        stored.updated_by = task.updated_by;
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        self.store
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound { entity: "task", id })
    }

    async fn delete_all(&self, owner: Option<i64>) -> RepositoryResult<Vec<Task>> {
        let mut store = self.store.write().await;
        let filter = TaskFilter {
            owner,
            ..Default::default()
        };

        let ids: Vec<i64> = store
            .rows
            .values()
            .filter(|t| filter.matches(t))
            .map(|t| t.id)
            .collect();

        Ok(ids
            .into_iter()
            .filter_map(|id| store.rows.remove(&id))
            .collect())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct UserStore {
    last_id: i64,
    rows: BTreeMap<i64, User>,
}

/// User repository backed by an ordered map
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<UserStore>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        let mut store = self.store.write().await;

        if store
            .rows
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RepositoryError::Conflict("users_email_key".to_string()));
        }

        store.last_id += 1;
        let now = Utc::now();
        let user = User {
            id: store.last_id,
            email: user.email,
            password_hash: user.password_hash,
            created_by: None,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };
        store.rows.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .store
            .read()
            .await
            .rows
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        Ok(self.store.read().await.rows.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_task(title: &str, owner: i64) -> NewTask {
        NewTask {
            title: title.to_string(),
            done: false,
            created_by: owner,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryTaskRepository::new();

        let first = repo.create(new_task("one", 1)).await.unwrap();
        let second = repo.create(new_task("two", 1)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.updated_by, 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let repo = InMemoryTaskRepository::new();
        let err = repo.get_by_id(42).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn test_list_paginates_and_counts() {
        let repo = InMemoryTaskRepository::new();
        for i in 0..5 {
            repo.create(new_task(&format!("task {i}"), 1)).await.unwrap();
        }
        repo.create(new_task("other", 2)).await.unwrap();

        let (page, total) = repo
            .list(&TaskFilter::for_owner(1), Pagination::new(Some(2), Some(3)))
            .await
            .unwrap();

        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title, "task 3");
        assert_eq!(page[1].title, "task 4");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryTaskRepository::new();
        let mut task = repo.create(new_task("x", 1)).await.unwrap();
        repo.delete(task.id).await.unwrap();

        task.title = "y".to_string();
        assert!(matches!(
            repo.update(&task).await,
            Err(RepositoryError::NotFound { .. })
        ));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_all_returns_snapshot() {
        let repo = InMemoryTaskRepository::new();
        let a = repo.create(new_task("a", 1)).await.unwrap();
        let b = repo.create(new_task("b", 1)).await.unwrap();
        let other = repo.create(new_task("c", 2)).await.unwrap();

        let removed = repo.delete_all(Some(1)).await.unwrap();
        assert_eq!(removed, vec![a, b]);
        assert_eq!(repo.len().await, 1);

        let removed = repo.delete_all(None).await.unwrap();
        assert_eq!(removed, vec![other]);
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_user_email_is_unique_case_insensitively() {
        let repo = InMemoryUserRepository::new();
        repo.create(NewUser {
            email: "a@example.com".to_string(),
            password_hash: "h".to_string(),
        })
        .await
        .unwrap();

        let err = repo
            .create(NewUser {
                email: "A@Example.com".to_string(),
                password_hash: "h".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let found = repo.find_by_email("A@EXAMPLE.COM").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(1));
    }
}
