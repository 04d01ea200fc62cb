//! Task model definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Stable task identifier assigned by the backend
pub type TaskId = String;

/// Task priority level
///
/// Only `High` means anything to the views; levels written by other clients
/// are kept as [`TaskPriority::Other`] instead of failing the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Other(String),
}

impl TaskPriority {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Other(label) => label,
        }
    }

    /// Map a stored label onto a level, case-insensitively
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Other(label.to_string()),
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parsing for user input: only the three known levels
impl FromStr for TaskPriority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match Self::from_label(value) {
            Self::Other(_) => Err(Error::Validation(format!(
                "Unsupported priority '{}'",
                value
            ))),
            level => Ok(level),
        }
    }
}

impl Serialize for TaskPriority {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskPriority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(|label| Self::from_label(&label))
    }
}

/// A to-do item owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    pub owner_id: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Whether the due date lies strictly before `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.date.is_some_and(|date| date < today)
    }

    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.date == Some(day)
    }
}

/// Contents of the add-task form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the due date
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Validate the draft and stamp it for `owner_id`
    pub fn into_new_task(self, owner_id: impl Into<String>) -> Result<NewTask> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("Title cannot be empty".to_string()));
        }

        Ok(NewTask {
            title: title.to_string(),
            category: sanitize_optional_string(self.category),
            priority: self.priority,
            date: self.date,
            completed: false,
            owner_id: owner_id.into(),
            created_at: Utc::now(),
        })
    }
}

/// A validated task record that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub completed: bool,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    pub fn with_id(self, id: impl Into<TaskId>) -> Task {
        Task {
            id: id.into(),
            title: self.title,
            category: self.category,
            priority: self.priority,
            date: self.date,
            completed: self.completed,
            owner_id: self.owner_id,
            created_at: self.created_at,
        }
    }
}

/// Partial update of a stored task
///
/// Completion is the only field that changes after creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_none()
    }

    pub fn apply(&self, task: &mut Task) {
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

fn sanitize_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
