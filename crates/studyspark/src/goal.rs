//! Goal wizard: which test, when it runs, and the target rank.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::TestWindow;

pub const MIN_STUDENTS: u32 = 20;
pub const MAX_STUDENTS: u32 = 1000;

/// Preset test names offered by the wizard, in school-year order
pub const PRESET_TESTS: &[&str] = &[
    "第１回定期考査",
    "第２回定期考査",
    "第３回定期考査",
    "第４回定期考査",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoalError {
    #[error("test name must not be empty")]
    EmptyTestName,

    #[error("test period ends ({end}) before it starts ({start})")]
    InvertedPeriod { start: NaiveDate, end: NaiveDate },

    #[error("number of students must be between 20 and 1000, got {0}")]
    TotalOutOfRange(u32),

    #[error("target rank must be between 1 and {total}, got {rank}")]
    RankOutOfRange { rank: u32, total: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalPlan {
    pub test_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub target_rank: u32,
    pub total_students: u32,
    /// Why the student wants this rank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GoalPlan {
    pub fn new(
        test_name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        target_rank: u32,
        total_students: u32,
    ) -> Result<Self, GoalError> {
        let test_name = test_name.trim();
        if test_name.is_empty() {
            return Err(GoalError::EmptyTestName);
        }
        if end_date < start_date {
            return Err(GoalError::InvertedPeriod {
                start: start_date,
                end: end_date,
            });
        }
        validate_rank(target_rank, total_students)?;

        Ok(Self {
            test_name: test_name.to_string(),
            start_date,
            end_date,
            target_rank,
            total_students,
            reason: None,
        })
    }

    /// Store a reason; blank input clears it
    pub fn set_reason(&mut self, reason: &str) {
        let reason = reason.trim();
        self.reason = (!reason.is_empty()).then(|| reason.to_string());
    }

    /// Where the target sits on a 0-100 line from top to bottom of the year
    pub fn flag_position(&self) -> f64 {
        if self.total_students == 0 {
            return 0.0;
        }
        (self.target_rank as f64 / self.total_students as f64 * 100.0).clamp(0.0, 100.0)
    }

    pub fn window(&self) -> TestWindow {
        TestWindow {
            name: self.test_name.clone(),
            start: self.start_date,
            end: self.end_date,
        }
    }
}

pub fn validate_rank(target_rank: u32, total_students: u32) -> Result<(), GoalError> {
    if !(MIN_STUDENTS..=MAX_STUDENTS).contains(&total_students) {
        return Err(GoalError::TotalOutOfRange(total_students));
    }
    if target_rank < 1 || target_rank > total_students {
        return Err(GoalError::RankOutOfRange {
            rank: target_rank,
            total: total_students,
        });
    }
    Ok(())
}

/// Usual two-day window for a preset test in the given year
pub fn default_period(test_name: &str, year: i32) -> Option<(NaiveDate, NaiveDate)> {
    let (month, first_day) = match test_name {
        "第１回定期考査" => (5, 20),
        "第２回定期考査" => (8, 30),
        "第３回定期考査" => (11, 20),
        "第４回定期考査" => (1, 30),
        _ => return None,
    };
    let start = NaiveDate::from_ymd_opt(year, month, first_day)?;
    let end = start.succ_opt()?;
    Some((start, end))
}

/// Default window for `test_name` in the year of `today`
pub fn default_period_for(test_name: &str, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    default_period(test_name, today.year())
}
