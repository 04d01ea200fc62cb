//! View filters over the task list

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskPriority};
use crate::{Error, Result};

/// The list view the user has selected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    /// Tasks due on the current local date
    Today,
    /// High priority tasks
    Important,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 3] = [Self::All, Self::Today, Self::Important];

    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Today => task.is_due_on(today),
            Self::Important => task.priority == Some(TaskPriority::High),
        }
    }

    /// The tasks this view shows, in their original order
    pub fn apply(self, tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
        tasks.iter().filter(|t| self.matches(t, today)).collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Important => "important",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All Tasks",
            Self::Today => "Today",
            Self::Important => "Important",
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "important" => Ok(Self::Important),
            _ => Err(Error::Validation(format!("Unknown view '{}'", value))),
        }
    }
}
