//! Parsing of prompt lines into commands

use chrono::NaiveDate;
use taskflow_core::task::{TaskDraft, TaskPriority};
use taskflow_core::TaskFilter;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for the list.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register { email: String, secret: String },
    Login { email: String, secret: String },
    Logout,
    Add(TaskDraft),
    Toggle(usize),
    Remove(usize),
    View(TaskFilter),
    List,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  register <email> <password>   create an account
  login <email> <password>      sign in
  logout                        sign out
  add <title> [#category] [!low|medium|high] [@YYYY-MM-DD|@today]
  done <n>                      toggle task n between done and open
  rm <n>                        delete task n
  view all|today|important      switch the task view
  list                          show the current view
  help                          show this help
  quit                          leave";

impl Command {
    /// Parse one prompt line; `today` resolves `@today`
    pub fn parse(line: &str, today: NaiveDate) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Self::List);
        };
        let rest: Vec<&str> = words.collect();

        match name.to_ascii_lowercase().as_str() {
            "register" => {
                let (email, secret) = credentials(&rest, "register <email> <password>")?;
                Ok(Self::Register { email, secret })
            }
            "login" => {
                let (email, secret) = credentials(&rest, "login <email> <password>")?;
                Ok(Self::Login { email, secret })
            }
            "logout" => Ok(Self::Logout),
            "add" => parse_draft(&rest, today).map(Self::Add),
            "done" | "toggle" => position(&rest, "done <n>").map(Self::Toggle),
            "rm" | "delete" => position(&rest, "rm <n>").map(Self::Remove),
            "view" => match rest.as_slice() {
                [filter] => filter
                    .parse::<TaskFilter>()
                    .map(Self::View)
                    .map_err(|e| CommandError::Invalid(e.to_string())),
                _ => Err(CommandError::Usage("view all|today|important")),
            },
            "list" | "ls" => Ok(Self::List),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn credentials(args: &[&str], usage: &'static str) -> Result<(String, String), CommandError> {
    match args {
        [email, secret] => Ok((email.to_string(), secret.to_string())),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// 1-based position as shown next to each card
fn position(args: &[&str], usage: &'static str) -> Result<usize, CommandError> {
    match args {
        [n] => n
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(CommandError::Usage(usage)),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// Split `add` arguments into the title and its `#`, `!` and `@` markers
///
/// An empty title is not an error here; adding the task rejects it.
fn parse_draft(args: &[&str], today: NaiveDate) -> Result<TaskDraft, CommandError> {
    let mut title = Vec::new();
    let mut draft = TaskDraft::default();

    for word in args {
        if let Some(category) = word.strip_prefix('#').filter(|c| !c.is_empty()) {
            draft.category = Some(category.to_string());
        } else if let Some(priority) = word.strip_prefix('!').filter(|p| !p.is_empty()) {
            let priority = priority
                .parse::<TaskPriority>()
                .map_err(|e| CommandError::Invalid(e.to_string()))?;
            draft.priority = Some(priority);
        } else if let Some(date) = word.strip_prefix('@').filter(|d| !d.is_empty()) {
            draft.date = Some(parse_date(date, today)?);
        } else {
            title.push(*word);
        }
    }

    draft.title = title.join(" ");
    Ok(draft)
}

fn parse_date(raw: &str, today: NaiveDate) -> Result<NaiveDate, CommandError> {
    if raw.eq_ignore_ascii_case("today") {
        return Ok(today);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| CommandError::Invalid(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}
