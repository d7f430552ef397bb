//! Spark checklist: the saved plan, per-task status changes, filters and
//! progress figures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::catalog::{find_book, Catalog};
use crate::generator::generate_for_selection;
use crate::range::{RangeError, RangeSelection};
use crate::types::{Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecklistError {
    #[error("no task with id {0}")]
    TaskNotFound(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("unknown book: {0}")]
    UnknownBook(String),

    #[error("{0} is not available yet")]
    BookUnavailable(String),

    #[error(transparent)]
    Range(#[from] RangeError),
}

/// The stored Spark record: what is being studied and the generated tasks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SparkPlan {
    pub subject: String,
    pub book: String,
    pub range: RangeSelection,
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
}

impl SparkPlan {
    /// Build a plan for a book by name, generating its tasks
    pub fn create(
        subject: &str,
        book: &str,
        range: RangeSelection,
        now: DateTime<Utc>,
    ) -> Result<Self, PlanError> {
        let catalog = usable_book(book)?;
        let tasks = generate_for_selection(catalog, &range)?;

        debug!(book = %book, count = tasks.len(), "Created spark plan");

        Ok(Self {
            subject: subject.to_string(),
            book: book.to_string(),
            range,
            tasks,
            created_at: now,
        })
    }

    pub fn progress(&self) -> Progress {
        Progress::from_tasks(&self.tasks)
    }
}

/// Look up a book that can be planned against
pub fn usable_book(name: &str) -> Result<&'static Catalog, PlanError> {
    let catalog = find_book(name).ok_or_else(|| PlanError::UnknownBook(name.to_string()))?;
    if !catalog.available {
        return Err(PlanError::BookUnavailable(name.to_string()));
    }
    Ok(catalog)
}

/// Set the status of one task, stamping `now`
pub fn set_task_status(
    tasks: &mut [Task],
    id: &str,
    status: TaskStatus,
    now: DateTime<Utc>,
) -> Result<(), ChecklistError> {
    let task = tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| ChecklistError::TaskNotFound(id.to_string()))?;

    task.set_status(status, now);
    debug!(id = %id, status = %status, "Task updated");
    Ok(())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Complete,
    /// Not answered yet
    Incomplete,
    Incorrect,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Complete => task.status == TaskStatus::Complete,
            TaskFilter::Incomplete => task.status == TaskStatus::Unset,
            TaskFilter::Incorrect => task.status == TaskStatus::Incorrect,
        }
    }
}

impl FromStr for TaskFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "complete" => Ok(TaskFilter::Complete),
            "incomplete" => Ok(TaskFilter::Incomplete),
            "incorrect" => Ok(TaskFilter::Incorrect),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub complete: usize,
    pub partial: usize,
    pub incorrect: usize,
    pub unanswered: usize,
}

impl Progress {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut progress = Progress {
            total: tasks.len(),
            ..Default::default()
        };
        for task in tasks {
            match task.status {
                TaskStatus::Complete => progress.complete += 1,
                TaskStatus::Partial => progress.partial += 1,
                TaskStatus::Incorrect => progress.incorrect += 1,
                TaskStatus::Unset => progress.unanswered += 1,
            }
        }
        progress
    }

    /// Share of fully correct tasks as a rounded percentage
    pub fn completion_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.complete as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Tasks of one section, in generation order
#[derive(Debug, PartialEq, Eq)]
pub struct SectionGroup<'a> {
    pub section: &'a str,
    pub tasks: Vec<&'a Task>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ChapterGroup<'a> {
    pub chapter: &'a str,
    pub sections: Vec<SectionGroup<'a>>,
}

/// Group tasks by chapter then section, keeping first-seen order and
/// dropping tasks the filter rejects. Empty sections are kept so the
/// outline stays stable across filters.
pub fn group_by_section<'a>(tasks: &'a [Task], filter: TaskFilter) -> Vec<ChapterGroup<'a>> {
    let mut groups: Vec<ChapterGroup<'a>> = Vec::new();

    for task in tasks {
        let chapter_idx = match groups.iter().position(|g| g.chapter == task.chapter) {
            Some(idx) => idx,
            None => {
                groups.push(ChapterGroup {
                    chapter: &task.chapter,
                    sections: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let sections = &mut groups[chapter_idx].sections;

        let section_idx = match sections.iter().position(|s| s.section == task.section) {
            Some(idx) => idx,
            None => {
                sections.push(SectionGroup {
                    section: &task.section,
                    tasks: Vec::new(),
                });
                sections.len() - 1
            }
        };

        if filter.matches(task) {
            sections[section_idx].tasks.push(task);
        }
    }

    groups
}
