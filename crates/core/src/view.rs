//! Task list view-model
//!
//! Pure projection from the task sequence to a renderable tree. A UI rebuilds
//! its task list from [`TaskListView`] on every change instead of patching it.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::filter::TaskFilter;
use crate::task::{Task, TaskId};

pub const CATEGORY_ICON: &str = "📁";
pub const PRIORITY_ICON: &str = "⚡";
pub const DATE_ICON: &str = "📅";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Toggle,
    Delete,
}

/// A button on a task card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAction {
    pub kind: ActionKind,
    pub label: &'static str,
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Category,
    Priority,
    DueDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTag {
    pub kind: TagKind,
    pub icon: &'static str,
    pub text: String,
    /// Due date lies before today
    pub overdue: bool,
}

impl TaskTag {
    fn new(kind: TagKind, icon: &'static str, text: impl Into<String>) -> Self {
        Self {
            kind,
            icon,
            text: text.into(),
            overdue: false,
        }
    }

    pub fn display(&self) -> String {
        format!("{} {}", self.icon, self.text)
    }
}

/// One rendered task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCard {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
    pub toggle: TaskAction,
    pub delete: TaskAction,
    pub tags: Vec<TaskTag>,
}

impl TaskCard {
    pub fn tag(&self, kind: TagKind) -> Option<&TaskTag> {
        self.tags.iter().find(|t| t.kind == kind)
    }
}

/// The rendered task list for the active filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListView {
    pub filter: TaskFilter,
    pub cards: Vec<TaskCard>,
}

impl TaskListView {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn card(&self, id: &str) -> Option<&TaskCard> {
        self.cards.iter().find(|c| c.id == id)
    }
}

/// Render the tasks that pass `filter`, disabling controls of pending tasks
pub fn render_task_list(
    tasks: &[Task],
    filter: TaskFilter,
    today: NaiveDate,
    pending: &HashSet<TaskId>,
) -> TaskListView {
    let cards = filter
        .apply(tasks, today)
        .into_iter()
        .map(|task| render_task_card(task, today, pending.contains(&task.id)))
        .collect();

    TaskListView { filter, cards }
}

pub fn render_task_card(task: &Task, today: NaiveDate, busy: bool) -> TaskCard {
    let mut tags = Vec::new();
    if let Some(category) = &task.category {
        tags.push(TaskTag::new(TagKind::Category, CATEGORY_ICON, category));
    }
    if let Some(priority) = &task.priority {
        tags.push(TaskTag::new(TagKind::Priority, PRIORITY_ICON, priority.as_str()));
    }
    if let Some(date) = task.date {
        let mut tag = TaskTag::new(TagKind::DueDate, DATE_ICON, date.format("%Y-%m-%d").to_string());
        tag.overdue = task.is_overdue(today);
        tags.push(tag);
    }

    TaskCard {
        id: task.id.clone(),
        title: task.title.clone(),
        completed: task.completed,
        toggle: TaskAction {
            kind: ActionKind::Toggle,
            label: if task.completed { "Undo" } else { "Done" },
            disabled: busy,
        },
        delete: TaskAction {
            kind: ActionKind::Delete,
            label: "Delete",
            disabled: busy,
        },
        tags,
    }
}
