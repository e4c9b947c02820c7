//! Work-log read use-cases.
//!
//! Thin lookups that compose [`SearchCriteria`] from optional inputs and
//! delegate to the store.

use crate::model::work_log::WorkLogRecord;
use crate::query::criteria::{DayFilter, SearchCriteria, Selector};
use crate::query::time_unit::TimeUnit;
use crate::repo::work_log_repo::{RepoResult, WorkLogStore};
use chrono::NaiveDate;

/// Read-side facade over a record store.
pub struct WorkLogService<S: WorkLogStore> {
    store: S,
}

impl<S: WorkLogStore> WorkLogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Finds records matching prebuilt criteria, e.g. from a parsed query.
    pub fn find_matching(&self, criteria: &SearchCriteria) -> RepoResult<Vec<WorkLogRecord>> {
        self.store.find(criteria)
    }

    /// Finds records for an optional day and optional owner.
    pub fn find(
        &self,
        date: Option<NaiveDate>,
        user: Option<&str>,
    ) -> RepoResult<Vec<WorkLogRecord>> {
        self.store.find(&SearchCriteria::compose(
            Selector::exact(user),
            None,
            DayFilter::date(date),
        ))
    }

    /// Finds records carrying the given tag.
    pub fn find_by_project(&self, project_name: &str) -> RepoResult<Vec<WorkLogRecord>> {
        self.store.find(&SearchCriteria::compose(
            None,
            Selector::exact(Some(project_name)),
            None,
        ))
    }

    /// Finds records owned by the given employee.
    pub fn find_by_employee(&self, employee_id: &str) -> RepoResult<Vec<WorkLogRecord>> {
        self.store.find(&SearchCriteria::compose(
            Selector::exact(Some(employee_id)),
            None,
            None,
        ))
    }

    /// Finds records within a month or on a single day.
    pub fn find_by_time_unit(&self, unit: &TimeUnit) -> RepoResult<Vec<WorkLogRecord>> {
        self.store.find(&SearchCriteria::compose(
            None,
            None,
            DayFilter::time_unit(Some(unit)),
        ))
    }

    /// Finds records within inclusive, optional day bounds.
    pub fn find_in_range(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> RepoResult<Vec<WorkLogRecord>> {
        self.store
            .find(&SearchCriteria::compose(None, None, DayFilter::range(from, to)))
    }
}
