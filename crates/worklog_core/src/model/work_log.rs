//! Work-log domain model.
//!
//! # Responsibility
//! - Define the canonical time-tracking record shared by queries and bulk edits.
//! - Validate record invariants before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another record.
//! - `day` is always a real calendar date rendered as `YYYY/MM/DD`.
//! - `tags` is an ordered set: unique, non-empty, trimmed values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Storage format of the `day` field.
pub const DAY_FORMAT: &str = "%Y/%m/%d";

/// Stable identifier of a work-log record (`WL.<uuid>`).
pub type WorkLogId = String;

/// Validation error for work-log invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkLogValidationError {
    EmptyEmployee,
    InvalidDay(String),
    EmptyTag,
    UntrimmedTag(String),
    DuplicateTag(String),
}

impl Display for WorkLogValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEmployee => write!(f, "employee id cannot be empty"),
            Self::InvalidDay(value) => {
                write!(f, "invalid day `{value}`; expected YYYY/MM/DD")
            }
            Self::EmptyTag => write!(f, "tag cannot be empty"),
            Self::UntrimmedTag(value) => write!(f, "tag `{value}` has surrounding whitespace"),
            Self::DuplicateTag(value) => write!(f, "duplicate tag `{value}`"),
        }
    }
}

impl Error for WorkLogValidationError {}

/// One time-tracking entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkLogRecord {
    pub id: WorkLogId,
    /// Owner of the record. Only the owner may bulk-edit it.
    pub employee_id: String,
    /// Day in `YYYY/MM/DD` form; zero padding keeps string order chronological.
    pub day: String,
    pub workload_minutes: u32,
    /// Ordered tag set (project names).
    pub tags: Vec<String>,
    pub note: Option<String>,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
}

impl WorkLogRecord {
    /// Creates a record with a generated id and the current timestamp.
    pub fn new(
        employee_id: impl Into<String>,
        day: NaiveDate,
        workload_minutes: u32,
        tags: Vec<String>,
    ) -> Self {
        Self {
            id: generate_work_log_id(),
            employee_id: employee_id.into(),
            day: format_day(day),
            workload_minutes,
            tags,
            note: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Returns a copy with the given note attached.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Parsed calendar day, when the stored string is well-formed.
    pub fn parsed_day(&self) -> Option<NaiveDate> {
        parse_day(&self.day)
    }

    /// Tags sorted alphabetically; the signature used for preset ranking.
    pub fn sorted_tags(&self) -> Vec<String> {
        let mut tags = self.tags.clone();
        tags.sort();
        tags
    }

    /// Checks record invariants.
    pub fn validate(&self) -> Result<(), WorkLogValidationError> {
        if self.employee_id.trim().is_empty() {
            return Err(WorkLogValidationError::EmptyEmployee);
        }
        if parse_day(&self.day).is_none() {
            return Err(WorkLogValidationError::InvalidDay(self.day.clone()));
        }

        let mut seen = HashSet::new();
        for tag in &self.tags {
            if tag.trim().is_empty() {
                return Err(WorkLogValidationError::EmptyTag);
            }
            if tag.trim() != tag {
                return Err(WorkLogValidationError::UntrimmedTag(tag.clone()));
            }
            if !seen.insert(tag.as_str()) {
                return Err(WorkLogValidationError::DuplicateTag(tag.clone()));
            }
        }
        Ok(())
    }
}

/// Generates a new record id in the `WL.<uuid-v4>` form.
pub fn generate_work_log_id() -> WorkLogId {
    format!("WL.{}", Uuid::new_v4())
}

/// Renders a date in storage form (`YYYY/MM/DD`).
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parses a strict `YYYY/MM/DD` day string.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, DAY_FORMAT).ok()
}
