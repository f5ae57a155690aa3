/// Task model and validation rules
///
/// A task is a personal to-do item owned by exactly one user. Ownership
/// (`created_by`) is fixed at creation time; updates only ever touch
/// `title`, `done`, `updated_by` and `updated_at`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id         BIGSERIAL PRIMARY KEY,
///     title      TEXT NOT NULL CHECK (LENGTH(BTRIM(title)) > 0),
///     done       BOOLEAN NOT NULL DEFAULT FALSE,
///     created_by BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     updated_by BIGINT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```
/// use tasknest_shared::models::task::NewTask;
/// use validator::Validate;
///
/// let new_task = NewTask {
///     title: "buy milk".to_string(),
///     done: false,
///     created_by: 7,
/// };
/// assert!(new_task.validate().is_ok());
/// ```

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// A persisted task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Task {
    /// Server-assigned identifier
    pub id: i64,

    /// What needs doing
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    /// Completion flag
    pub done: bool,

    /// Owner of the task
    pub created_by: i64,

    /// Last user to modify the task
    pub updated_by: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
///
/// `created_by` is always the authenticated caller, never client input.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTask {
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    pub done: bool,

    pub created_by: i64,
}

/// Partial update merged onto a loaded task
///
/// Only fields that are `Some` change. Ownership is not part of the patch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TaskPatch {
    pub title: Option<String>,

    pub done: Option<bool>,
}

impl TaskPatch {
    /// Merges the present fields onto `task` and stamps the editor
    pub fn apply(self, task: &mut Task, editor: i64) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(done) = self.done {
            task.done = done;
        }
        task.updated_by = editor;
    }
}

/// Listing filter
///
/// `title` is a case-insensitive substring match. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub owner: Option<i64>,

    pub title: Option<String>,

    pub done: Option<bool>,
}

impl TaskFilter {
    /// Filter restricted to a single owner
    pub fn for_owner(owner: i64) -> Self {
        Self {
            owner: Some(owner),
            ..Default::default()
        }
    }

    /// Evaluates the filter against a task in memory
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(owner) = self.owner {
            if task.created_by != owner {
                return false;
            }
        }
        if let Some(done) = self.done {
            if task.done != done {
                return false;
            }
        }
        if let Some(ref needle) = self.title {
            if !task.title.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Rejects empty and whitespace-only titles
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::from("Title must not be empty"));
        return Err(err);
    }
    Ok(())
}
