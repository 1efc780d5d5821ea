//! Mediates the add and complete mutations and describes the resulting page change.

use serde::Serialize;
use utoipa::ToSchema;

use super::view::{ControlBinding, ListView, render_task_list, row_id};
use super::{Actor, TaskId, TaskStore};

pub const TASK_ADDED: &str = "Task added";
pub const UNABLE_TO_ADD_TASK: &str = "Unable to add task";
pub const ITEM_UPDATED: &str = "Item updated";
pub const UNABLE_TO_UPDATE_ITEM: &str = "Unable to update item";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Status,
    Error,
}

/// A user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn status(message: &str) -> Self {
        Self {
            level: NoticeLevel::Status,
            message: message.to_string(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.to_string(),
        }
    }
}

/// What changed in the rendered view after a mutation.
///
/// An all-empty delta means "nothing happened"; clients leave their view untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageDelta {
    /// Replacement for the whole task list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerendered_list: Option<ListView>,
    /// DOM id of a row to remove.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_row_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub control_bindings: Vec<ControlBinding>,
}

impl PageDelta {
    fn notice_only(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            ..Default::default()
        }
    }

    /// True when the delta carries no change at all.
    pub fn is_noop(&self) -> bool {
        self == &Self::default()
    }
}

/// Stateless mediator between requests and the [`TaskStore`].
pub struct ListController<'a, S: TaskStore + ?Sized> {
    store: &'a S,
    complete_url: &'a str,
}

impl<'a, S: TaskStore + ?Sized> ListController<'a, S> {
    /// `complete_url` is advertised in the control bindings of re-rendered rows.
    pub fn new(store: &'a S, complete_url: &'a str) -> Self {
        Self {
            store,
            complete_url,
        }
    }

    /// Creates a task owned by `actor` with `title` taken verbatim.
    ///
    /// Empty titles are accepted.
    #[tracing::instrument(skip(self))]
    pub async fn add_task(&self, actor: &Actor, title: &str) -> PageDelta {
        let task_id = match self.store.create(actor, title).await {
            Ok(task_id) => task_id,
            Err(err) => {
                tracing::error!("Failed to add task for {}: {}", actor, err);
                return PageDelta::notice_only(Notice::error(UNABLE_TO_ADD_TASK));
            }
        };
        tracing::info!("Added task {} for {}", task_id, actor);

        // The task exists at this point, so a failed reload still reports success.
        match self.store.load_all_by_owner(actor).await {
            Ok(tasks) => {
                let list = render_task_list(&tasks);
                let control_bindings = list.control_bindings(self.complete_url);
                PageDelta {
                    rerendered_list: Some(list),
                    removed_row_id: None,
                    notice: Some(Notice::status(TASK_ADDED)),
                    control_bindings,
                }
            }
            Err(err) => {
                tracing::warn!("Added task {} but failed to reload list: {}", task_id, err);
                PageDelta::notice_only(Notice::status(TASK_ADDED))
            }
        }
    }

    /// Completes (deletes) a task if `actor` owns it.
    ///
    /// Unknown tasks and tasks owned by someone else yield an empty delta.
    #[tracing::instrument(skip(self))]
    pub async fn complete_task(&self, actor: &Actor, task_id: TaskId) -> PageDelta {
        let task = match self.store.load(task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                tracing::debug!("Ignoring completion of unknown task {}", task_id);
                return PageDelta::default();
            }
            Err(err) => {
                tracing::error!("Failed to load task {}: {}", task_id, err);
                return PageDelta::notice_only(Notice::error(UNABLE_TO_UPDATE_ITEM));
            }
        };

        if !task.is_owned_by(actor) {
            tracing::debug!("Ignoring completion of task {} by non-owner {}", task_id, actor);
            return PageDelta::default();
        }

        match self.store.delete(task_id).await {
            Ok(()) => {
                tracing::info!("Completed task {} for {}", task_id, actor);
                PageDelta {
                    removed_row_id: Some(row_id(task_id)),
                    notice: Some(Notice::status(ITEM_UPDATED)),
                    ..Default::default()
                }
            }
            Err(err) => {
                tracing::error!("Failed to complete task {}: {}", task_id, err);
                PageDelta::notice_only(Notice::error(UNABLE_TO_UPDATE_ITEM))
            }
        }
    }

    /// Renders the current list of `actor`'s tasks.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, actor: &Actor) -> Result<ListView, super::TaskStoreError> {
        let tasks = self.store.load_all_by_owner(actor).await?;
        Ok(render_task_list(&tasks))
    }
}
