//! Projection of a task sequence into a display structure.

use serde::Serialize;
use utoipa::ToSchema;

use super::{Task, TaskId};

/// Message shown in place of rows when an actor has no tasks.
pub const EMPTY_LIST_MESSAGE: &str = "There are no tasks yet.";

/// Column headers of the task table.
pub const LIST_HEADER: [&str; 2] = ["Task", "Complete"];

/// The rendered projection of a task sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ListView {
    pub header: Vec<String>,
    pub rows: Vec<ListRow>,
}

/// A single row of the task table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ListRow {
    Task(TaskRow),
    /// Placeholder shown when there are no tasks.
    Empty { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    /// DOM id of the row, `todo-{id}`.
    pub row_id: String,
    pub checkbox: Checkbox,
    pub action: CompleteAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Checkbox {
    pub label: String,
    pub checked: bool,
}

/// Control that triggers the complete intent for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAction {
    pub task_id: TaskId,
    /// Form element name, identical to the row id.
    pub name: String,
}

/// Wiring a client needs to make a complete control interactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ControlBinding {
    /// CSS selector of the control's row.
    pub selector: String,
    pub event: String,
    pub url: String,
    pub task_id: TaskId,
}

/// DOM id of the row displaying `id`.
pub fn row_id(id: TaskId) -> String {
    format!("todo-{}", id)
}

/// Renders `tasks` as one row each, or a single placeholder row when there are none.
pub fn render_task_list(tasks: &[Task]) -> ListView {
    let rows = if tasks.is_empty() {
        vec![ListRow::Empty {
            message: EMPTY_LIST_MESSAGE.to_string(),
        }]
    } else {
        tasks.iter().map(render_task_row).collect()
    };

    ListView {
        header: LIST_HEADER.iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

fn render_task_row(task: &Task) -> ListRow {
    ListRow::Task(TaskRow {
        row_id: row_id(task.id()),
        checkbox: Checkbox {
            label: task.title().to_string(),
            checked: false,
        },
        action: CompleteAction {
            task_id: task.id(),
            name: row_id(task.id()),
        },
    })
}

impl ListView {
    /// Task rows only; the placeholder row is skipped.
    pub fn task_rows(&self) -> impl Iterator<Item = &TaskRow> {
        self.rows.iter().filter_map(|row| match row {
            ListRow::Task(task_row) => Some(task_row),
            ListRow::Empty { .. } => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.task_rows().next().is_none()
    }

    /// Bindings wiring every complete control to `complete_url` on click.
    pub fn control_bindings(&self, complete_url: &str) -> Vec<ControlBinding> {
        self.task_rows()
            .map(|row| ControlBinding {
                selector: format!("#{}", row.row_id),
                event: "click".to_string(),
                url: complete_url.to_string(),
                task_id: row.action.task_id,
            })
            .collect()
    }
}
