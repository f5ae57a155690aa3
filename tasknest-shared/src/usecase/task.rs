/// Task use-cases
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasknest_shared::models::page::Pagination;
/// use tasknest_shared::repository::InMemoryTaskRepository;
/// use tasknest_shared::usecase::{NewTaskInput, TaskQuery, TaskUsecase};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tasks = TaskUsecase::new(Arc::new(InMemoryTaskRepository::new()));
///
/// let task = tasks
///     .create_task(7, NewTaskInput { title: "buy milk".into(), done: false })
///     .await?;
/// let page = tasks.list_tasks(7, TaskQuery::default(), Pagination::default()).await?;
/// assert_eq!(page.data, vec![task]);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};
use utoipa::ToSchema;
use validator::Validate;

use super::{UsecaseError, UsecaseResult};
use crate::models::{
    page::{Page, Pagination},
    task::{NewTask, Task, TaskFilter, TaskPatch},
};
use crate::repository::TaskRepository;

/// Client-supplied fields of a new task
///
/// A missing `title` deserializes as empty and is rejected by validation,
/// not by the JSON parser.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewTaskInput {
    #[serde(default)]
    #[schema(example = "Water the plants")]
    pub title: String,

    #[serde(default)]
    pub done: bool,
}

/// Listing criteria; ownership is implied by the actor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Case-insensitive substring of the title
    pub title: Option<String>,

    pub done: Option<bool>,
}

/// Task operations on behalf of an authenticated user
#[derive(Clone)]
pub struct TaskUsecase {
    repo: Arc<dyn TaskRepository>,
}

impl TaskUsecase {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    /// Validates and stores a task owned by `actor`
    pub async fn create_task(&self, actor: i64, input: NewTaskInput) -> UsecaseResult<Task> {
        let new_task = NewTask {
            title: input.title,
            done: input.done,
            created_by: actor,
        };
        new_task.validate()?;

        let task = self.repo.create(new_task).await?;
        info!(task_id = task.id, user_id = actor, "Task created");
        Ok(task)
    }

    /// Loads a task the actor owns
    ///
    /// Tasks owned by other users are reported as not found.
    pub async fn get_task(&self, actor: i64, id: i64) -> UsecaseResult<Task> {
        let task = self.repo.get_by_id(id).await?;

        if task.created_by != actor {
            debug!(task_id = id, user_id = actor, "Task belongs to another user");
            return Err(UsecaseError::NotFound { entity: "task", id });
        }
        Ok(task)
    }

    /// Lists the actor's tasks matching `query`, one page at a time
    pub async fn list_tasks(
        &self,
        actor: i64,
        query: TaskQuery,
        pagination: Pagination,
    ) -> UsecaseResult<Page<Task>> {
        let filter = TaskFilter {
            owner: Some(actor),
            title: query.title.filter(|t| !t.is_empty()),
            done: query.done,
        };

        let (data, total) = self.repo.list(&filter, pagination).await?;
        Ok(Page::new(data, total, pagination))
    }

    /// Merges `patch` onto the actor's task, re-validates and saves it
    pub async fn update_task(&self, actor: i64, id: i64, patch: TaskPatch) -> UsecaseResult<Task> {
        let mut task = self.get_task(actor, id).await?;

        patch.apply(&mut task, actor);
        task.validate()?;

        let task = self.repo.update(&task).await?;
        info!(task_id = id, user_id = actor, "Task updated");
        Ok(task)
    }

    /// Deletes one of the actor's tasks
    pub async fn delete_task(&self, actor: i64, id: i64) -> UsecaseResult<()> {
        self.get_task(actor, id).await?;
        self.repo.delete(id).await?;

        info!(task_id = id, user_id = actor, "Task deleted");
        Ok(())
    }

    /// Deletes every task the actor owns and returns what was removed
    pub async fn delete_all(&self, actor: i64) -> UsecaseResult<Vec<Task>> {
        let removed = self.repo.delete_all(Some(actor)).await?;

        let ids: Vec<i64> = removed.iter().map(|t| t.id).collect();
        info!(user_id = actor, count = removed.len(), task_ids = ?ids, "Deleted all tasks");
        Ok(removed)
    }

    /// Storage liveness
    pub async fn ping(&self) -> UsecaseResult<()> {
        Ok(self.repo.ping().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryTaskRepository;

    const ALICE: i64 = 1;
    const BOB: i64 = 2;

    fn usecase() -> (TaskUsecase, InMemoryTaskRepository) {
        let repo = InMemoryTaskRepository::new();
        (TaskUsecase::new(Arc::new(repo.clone())), repo)
    }

    fn input(title: &str) -> NewTaskInput {
        NewTaskInput {
            title: title.to_string(),
            done: false,
        }
    }

    #[tokio::test]
    async fn test_create_stamps_actor() {
        let (tasks, _) = usecase();

        let task = tasks.create_task(ALICE, input("Write report")).await.unwrap();

        assert_eq!(task.created_by, ALICE);
        assert_eq!(task.updated_by, ALICE);
        assert!(!task.done);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title_without_writing() {
        let (tasks, repo) = usecase();

        for title in ["", "   "] {
            let err = tasks.create_task(ALICE, input(title)).await.unwrap_err();
            match err {
                UsecaseError::Validation(errors) => {
                    assert!(errors.field_errors().contains_key("title"))
                }
                other => panic!("expected validation error, got {other:?}"),
            }
        }
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_hides_foreign_tasks() {
        let (tasks, _) = usecase();
        let task = tasks.create_task(ALICE, input("private")).await.unwrap();

        assert_eq!(tasks.get_task(ALICE, task.id).await.unwrap(), task);
        assert!(matches!(
            tasks.get_task(BOB, task.id).await,
            Err(UsecaseError::NotFound { .. })
        ));
        assert!(matches!(
            tasks.get_task(ALICE, 999).await,
            Err(UsecaseError::NotFound { id: 999, .. })
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let (tasks, _) = usecase();
        for title in ["Buy milk", "buy bread", "Call mom", "Buy eggs"] {
            tasks.create_task(ALICE, input(title)).await.unwrap();
        }
        tasks.create_task(BOB, input("Buy a boat")).await.unwrap();

        let page = tasks
            .list_tasks(
                ALICE,
                TaskQuery {
                    title: Some("BUY".to_string()),
                    done: None,
                },
                Pagination::new(Some(2), Some(1)),
            )
            .await
            .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.limit, 2);
        assert_eq!(page.offset, 1);
        let titles: Vec<&str> = page.data.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["buy bread", "Buy eggs"]);
    }

    #[tokio::test]
    async fn test_list_offset_past_end_is_empty() {
        let (tasks, _) = usecase();
        tasks.create_task(ALICE, input("only")).await.unwrap();

        let page = tasks
            .list_tasks(ALICE, TaskQuery::default(), Pagination::new(None, Some(50)))
            .await
            .unwrap();

        assert!(page.data.is_empty());
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_list_by_done_flag() {
        let (tasks, _) = usecase();
        let a = tasks.create_task(ALICE, input("a")).await.unwrap();
        tasks.create_task(ALICE, input("b")).await.unwrap();
        tasks
            .update_task(
                ALICE,
                a.id,
                TaskPatch {
                    done: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let page = tasks
            .list_tasks(
                ALICE,
                TaskQuery {
                    title: None,
                    done: Some(true),
                },
                Pagination::default(),
            )
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].id, a.id);
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_owner() {
        let (tasks, _) = usecase();
        let task = tasks.create_task(ALICE, input("Draft")).await.unwrap();

        let updated = tasks
            .update_task(
                ALICE,
                task.id,
                TaskPatch {
                    title: Some("Final".to_string()),
                    done: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Final");
        assert!(!updated.done);
        assert_eq!(updated.created_by, ALICE);
        assert_eq!(updated.created_at, task.created_at);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_title() {
        let (tasks, repo) = usecase();
        let task = tasks.create_task(ALICE, input("Keep me")).await.unwrap();

        let err = tasks
            .update_task(
                ALICE,
                task.id,
                TaskPatch {
                    title: Some(" ".to_string()),
                    done: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UsecaseError::Validation(_)));
        assert_eq!(repo.get_by_id(task.id).await.unwrap().title, "Keep me");
    }

    #[tokio::test]
    async fn test_update_foreign_task_is_not_found() {
        let (tasks, repo) = usecase();
        let task = tasks.create_task(ALICE, input("mine")).await.unwrap();

        let err = tasks
            .update_task(
                BOB,
                task.id,
                TaskPatch {
                    done: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, UsecaseError::NotFound { .. }));
        assert!(!repo.get_by_id(task.id).await.unwrap().done);
    }

    #[tokio::test]
    async fn test_delete_task() {
        let (tasks, _) = usecase();
        let task = tasks.create_task(ALICE, input("gone soon")).await.unwrap();

        assert!(matches!(
            tasks.delete_task(BOB, task.id).await,
            Err(UsecaseError::NotFound { .. })
        ));
        tasks.delete_task(ALICE, task.id).await.unwrap();
        assert!(matches!(
            tasks.delete_task(ALICE, task.id).await,
            Err(UsecaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_all_only_touches_actor() {
        let (tasks, repo) = usecase();
        tasks.create_task(ALICE, input("a1")).await.unwrap();
        tasks.create_task(ALICE, input("a2")).await.unwrap();
        let bobs = tasks.create_task(BOB, input("b1")).await.unwrap();

        let removed = tasks.delete_all(ALICE).await.unwrap();

        assert_eq!(removed.len(), 2);
        assert!(removed.iter().all(|t| t.created_by == ALICE));
        assert_eq!(repo.len().await, 1);
        assert_eq!(tasks.get_task(BOB, bobs.id).await.unwrap(), bobs);

        assert!(tasks.delete_all(ALICE).await.unwrap().is_empty());
    }
}
