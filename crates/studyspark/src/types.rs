use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a single problem went for the student
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not answered yet
    #[default]
    Unset,
    Complete,
    Partial,
    Incorrect,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Unset => "unset",
            TaskStatus::Complete => "complete",
            TaskStatus::Partial => "partial",
            TaskStatus::Incorrect => "incorrect",
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, TaskStatus::Unset)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unset" | "none" => Ok(TaskStatus::Unset),
            "complete" => Ok(TaskStatus::Complete),
            "partial" => Ok(TaskStatus::Partial),
            "incorrect" => Ok(TaskStatus::Incorrect),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// One problem of the selected test range
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Task {
    /// Stable ID, see [`Task::stable_id`]
    pub id: String,

    /// Chapter label (e.g., "第1章")
    pub chapter: String,

    /// Section title within the chapter
    pub section: String,

    /// Problem number, unique within its section
    pub problem: u32,

    #[serde(default)]
    pub status: TaskStatus,

    /// When the status was last changed. Present iff `status` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create an unanswered task
    pub fn new(chapter: &str, section: &str, problem: u32) -> Self {
        Self {
            id: Self::stable_id(chapter, section, problem),
            chapter: chapter.to_string(),
            section: section.to_string(),
            problem,
            status: TaskStatus::Unset,
            updated_at: None,
        }
    }

    /// Generate the ID for a problem.
    /// Section titles repeat across chapters ("章末問題"), so the chapter label
    /// is part of the key. Dashes and backslashes inside a label are escaped
    /// with a backslash so the three parts can always be told apart.
    pub fn stable_id(chapter: &str, section: &str, problem: u32) -> String {
        format!("{}-{}-{}", escape_id_part(chapter), escape_id_part(section), problem)
    }

    /// Change the status, stamping `now`. Resetting to `Unset` clears the stamp.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = status.is_set().then_some(now);
    }
}

fn escape_id_part(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        if c == '-' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
