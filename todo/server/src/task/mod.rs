//! Per-user TODO tasks.
//!
//! A task belongs to the actor who created it. Completing a task removes it
//! from the store, and only its owner may do so.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

pub mod api;
pub mod controller;
pub mod store;
pub mod view;
pub mod web;

pub use controller::{ListController, Notice, NoticeLevel, PageDelta};
pub use store::SeaOrmTaskStore;
pub use view::{ListRow, ListView, render_task_list};

/// Identifier of a task. Assigned by the store and never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct TaskId(i32);

impl TaskId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the raw database value.
    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity performing a request. Tasks are owned by actors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single TODO item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    owner: Actor,
    title: String,
}

impl Task {
    pub fn new(id: TaskId, owner: Actor, title: String) -> Self {
        Self { id, owner, title }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the actor that created the task.
    pub fn owner(&self) -> &Actor {
        &self.owner
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether `actor` may mutate this task.
    pub fn is_owned_by(&self, actor: &Actor) -> bool {
        &self.owner == actor
    }
}

/// Error type for task store operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskStoreError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// The task does not exist (any more).
    #[error("Task with ID {0} not found")]
    NotFound(TaskId),
}

/// Persistent storage of tasks, shared by all actors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persists a new task and returns its freshly assigned ID.
    async fn create(&self, owner: &Actor, title: &str) -> Result<TaskId, TaskStoreError>;

    /// Loads a single task, or `None` if it does not exist.
    async fn load(&self, id: TaskId) -> Result<Option<Task>, TaskStoreError>;

    /// Loads every task owned by `owner`, oldest first.
    async fn load_all_by_owner(&self, owner: &Actor) -> Result<Vec<Task>, TaskStoreError>;

    /// Removes a task. Fails with [`TaskStoreError::NotFound`] if nothing was removed.
    async fn delete(&self, id: TaskId) -> Result<(), TaskStoreError>;
}
