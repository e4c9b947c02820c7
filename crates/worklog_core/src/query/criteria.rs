//! Store-agnostic search criteria.
//!
//! # Responsibility
//! - Compose optional filter dimensions (employee, project, day) into one value.
//! - Define the matching semantics every store implementation must honor.
//!
//! # Invariants
//! - Each dimension owns exactly one slot, so two filters on the same field
//!   cannot be combined by accident.
//! - Absent or empty inputs produce no constraint.
//! - Dimensions combine with AND; `AnyOf` selectors combine with OR.

use crate::model::work_log::{format_day, WorkLogRecord};
use crate::query::time_unit::TimeUnit;
use chrono::NaiveDate;

/// Equality or membership constraint over a string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Exact(String),
    AnyOf(Vec<String>),
}

impl Selector {
    /// Exact-match selector; `None` when the value is absent or empty.
    pub fn exact(value: Option<&str>) -> Option<Self> {
        value
            .filter(|value| !value.is_empty())
            .map(|value| Self::Exact(value.to_string()))
    }

    /// Membership selector; `None` when the list is empty.
    pub fn any_of(values: &[String]) -> Option<Self> {
        if values.is_empty() {
            None
        } else {
            Some(Self::AnyOf(values.to_vec()))
        }
    }

    /// Values accepted by this selector.
    pub fn values(&self) -> &[String] {
        match self {
            Self::Exact(value) => std::slice::from_ref(value),
            Self::AnyOf(values) => values,
        }
    }

    pub fn accepts(&self, candidate: &str) -> bool {
        self.values().iter().any(|value| value == candidate)
    }
}

/// Constraint over the `day` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayFilter {
    /// Exact `YYYY/MM/DD` day.
    Exact(String),
    /// Inclusive bounds; at least one side is set.
    Range {
        from: Option<String>,
        to: Option<String>,
    },
    /// Any day within one of the units. Never empty.
    TimeUnits(Vec<TimeUnit>),
}

impl DayFilter {
    /// Exact day filter; `None` when no date is given.
    pub fn date(date: Option<NaiveDate>) -> Option<Self> {
        date.map(|date| Self::Exact(format_day(date)))
    }

    /// Inclusive range filter; `None` when both bounds are absent.
    pub fn range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<Self> {
        if from.is_none() && to.is_none() {
            return None;
        }
        Some(Self::Range {
            from: from.map(format_day),
            to: to.map(format_day),
        })
    }

    /// Filter for one time unit.
    pub fn time_unit(unit: Option<&TimeUnit>) -> Option<Self> {
        unit.map(|unit| Self::TimeUnits(vec![*unit]))
    }

    /// Filter matching any of the units; `None` for an empty list.
    pub fn time_units(units: &[TimeUnit]) -> Option<Self> {
        if units.is_empty() {
            None
        } else {
            Some(Self::TimeUnits(units.to_vec()))
        }
    }

    /// Unanchored regular expression for stores: `(p1)|(p2)|...`.
    ///
    /// `None` for exact and range filters, which compare strings directly.
    pub fn search_pattern(&self) -> Option<String> {
        match self {
            Self::TimeUnits(units) => Some(
                units
                    .iter()
                    .map(|unit| format!("({})", unit.search_pattern()))
                    .collect::<Vec<_>>()
                    .join("|"),
            ),
            Self::Exact(_) | Self::Range { .. } => None,
        }
    }

    pub fn accepts(&self, day: &str) -> bool {
        match self {
            Self::Exact(value) => value == day,
            Self::Range { from, to } => {
                from.as_deref().map_or(true, |from| day >= from)
                    && to.as_deref().map_or(true, |to| day <= to)
            }
            Self::TimeUnits(units) => units.iter().any(|unit| unit.contains_day(day)),
        }
    }
}

/// Immutable criteria value consumed by record stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    /// Record owner (`employee_id`).
    pub employee: Option<Selector>,
    /// Any of the record tags.
    pub project: Option<Selector>,
    pub day: Option<DayFilter>,
}

impl SearchCriteria {
    /// Criteria matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Composes the optional dimensions into one criteria value.
    pub fn compose(
        employee: Option<Selector>,
        project: Option<Selector>,
        day: Option<DayFilter>,
    ) -> Self {
        Self {
            employee,
            project,
            day,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.employee.is_none() && self.project.is_none() && self.day.is_none()
    }

    /// Reference matching semantics for one record.
    pub fn matches(&self, record: &WorkLogRecord) -> bool {
        let employee_ok = self
            .employee
            .as_ref()
            .map_or(true, |selector| selector.accepts(&record.employee_id));
        let project_ok = self.project.as_ref().map_or(true, |selector| {
            record.tags.iter().any(|tag| selector.accepts(tag))
        });
        let day_ok = self
            .day
            .as_ref()
            .map_or(true, |filter| filter.accepts(&record.day));
        employee_ok && project_ok && day_ok
    }
}
