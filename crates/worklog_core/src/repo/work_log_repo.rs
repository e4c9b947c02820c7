//! Work-log record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Execute [`SearchCriteria`] as filtered find and distinct-value listing.
//! - Apply ordered sequences of bulk tag updates.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `WorkLogRecord::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Each bulk sub-operation commits on its own; a sequence is not atomic as a
//!   whole, and a failed sub-operation leaves earlier ones applied.
//! - Tag order is preserved through `work_log_tags.position`.

use crate::db::DbError;
use crate::model::work_log::{WorkLogId, WorkLogRecord, WorkLogValidationError};
use crate::query::criteria::{DayFilter, SearchCriteria, Selector};
use crate::query::expression::TagUpdate;
use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RECORD_SELECT_SQL: &str = "SELECT
    wl.id,
    wl.employee_id,
    wl.day,
    wl.workload_minutes,
    wl.note,
    wl.created_at
FROM work_logs wl";

pub type RepoResult<T> = Result<T, RepoError>;

/// Store error for work-log persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(WorkLogValidationError),
    Db(DbError),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted work-log data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<WorkLogValidationError> for RepoError {
    fn from(value: WorkLogValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Field whose distinct values can be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistinctField {
    /// Record owner ids.
    Employee,
    /// Tag names across all tags of matched records.
    Tag,
}

/// One update-many step of a bulk write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOperation {
    pub criteria: SearchCriteria,
    pub update: TagUpdate,
}

/// Outcome of [`WorkLogStore::bulk_apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkWriteResult {
    /// Records whose tag set changed, one entry per sub-operation, in order.
    pub modified_counts: Vec<usize>,
}

impl BulkWriteResult {
    /// Modified count of the last sub-operation (0 when empty).
    pub fn last_modified(&self) -> usize {
        self.modified_counts.last().copied().unwrap_or(0)
    }
}

/// Record-store contract consumed by the engine services.
pub trait WorkLogStore {
    /// Returns every record matching the criteria.
    fn find(&self, criteria: &SearchCriteria) -> RepoResult<Vec<WorkLogRecord>>;
    /// Returns distinct values of `field` across matching records, sorted.
    fn distinct(&self, field: DistinctField, criteria: &SearchCriteria)
        -> RepoResult<Vec<String>>;
    /// Runs the operations in order, stopping at the first failure.
    fn bulk_apply(&self, operations: &[BulkOperation]) -> RepoResult<BulkWriteResult>;
}

/// SQLite-backed work-log store.
pub struct SqliteWorkLogStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWorkLogStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for table in ["work_logs", "work_log_tags"] {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    /// Persists one record with its tags. Used by imports and fixtures.
    pub fn insert_record(&self, record: &WorkLogRecord) -> RepoResult<WorkLogId> {
        record.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO work_logs (
                id,
                employee_id,
                day,
                workload_minutes,
                note,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                record.id.as_str(),
                record.employee_id.as_str(),
                record.day.as_str(),
                record.workload_minutes,
                record.note.as_deref(),
                record.created_at,
            ],
        )?;
        for (position, tag) in record.tags.iter().enumerate() {
            tx.execute(
                "INSERT INTO work_log_tags (work_log_id, position, name) VALUES (?1, ?2, ?3);",
                params![record.id.as_str(), position as i64, tag.as_str()],
            )?;
        }
        tx.commit()?;

        debug!(
            "event=work_log_insert module=repo status=ok tags={}",
            record.tags.len()
        );
        Ok(record.id.clone())
    }

    /// Gets one record by id.
    pub fn get_record(&self, id: &str) -> RepoResult<Option<WorkLogRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE wl.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.parse_record_row(row)?));
        }
        Ok(None)
    }

    fn parse_record_row(&self, row: &Row<'_>) -> RepoResult<WorkLogRecord> {
        let id: String = row.get("id")?;
        let minutes: i64 = row.get("workload_minutes")?;
        let workload_minutes = u32::try_from(minutes).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid workload `{minutes}` in work_logs.workload_minutes"
            ))
        })?;
        let tags = load_tags(self.conn, &id)?;

        let record = WorkLogRecord {
            id,
            employee_id: row.get("employee_id")?,
            day: row.get("day")?,
            workload_minutes,
            tags,
            note: row.get("note")?,
            created_at: row.get("created_at")?,
        };
        record.validate()?;
        Ok(record)
    }

    fn matching_ids(&self, criteria: &SearchCriteria) -> RepoResult<Vec<String>> {
        let mut sql = String::from("SELECT wl.id FROM work_logs wl WHERE 1 = 1");
        let mut bind_values = Vec::new();
        push_criteria(criteria, &mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }

    fn apply_update(&self, id: &str, update: &TagUpdate) -> RepoResult<bool> {
        let mut changed = 0;
        match update {
            TagUpdate::AddToSet(tags) => {
                for tag in tags {
                    changed += self.conn.execute(
                        "INSERT OR IGNORE INTO work_log_tags (work_log_id, position, name)
                         VALUES (
                            ?1,
                            (SELECT COALESCE(MAX(position), -1) + 1
                             FROM work_log_tags
                             WHERE work_log_id = ?1),
                            ?2
                         );",
                        params![id, tag.as_str()],
                    )?;
                }
            }
            TagUpdate::Pull(tags) => {
                for tag in tags {
                    changed += self.conn.execute(
                        "DELETE FROM work_log_tags WHERE work_log_id = ?1 AND name = ?2;",
                        params![id, tag.as_str()],
                    )?;
                }
            }
        }
        Ok(changed > 0)
    }
}

impl WorkLogStore for SqliteWorkLogStore<'_> {
    fn find(&self, criteria: &SearchCriteria) -> RepoResult<Vec<WorkLogRecord>> {
        let mut sql = format!("{RECORD_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values = Vec::new();
        push_criteria(criteria, &mut sql, &mut bind_values);
        sql.push_str(" ORDER BY wl.day ASC, wl.created_at ASC, wl.id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(self.parse_record_row(row)?);
        }
        Ok(records)
    }

    fn distinct(
        &self,
        field: DistinctField,
        criteria: &SearchCriteria,
    ) -> RepoResult<Vec<String>> {
        let mut sql = match field {
            DistinctField::Employee => {
                String::from("SELECT DISTINCT wl.employee_id FROM work_logs wl WHERE 1 = 1")
            }
            DistinctField::Tag => String::from(
                "SELECT DISTINCT t.name
                 FROM work_log_tags t
                 INNER JOIN work_logs wl ON wl.id = t.work_log_id
                 WHERE 1 = 1",
            ),
        };
        let mut bind_values = Vec::new();
        push_criteria(criteria, &mut sql, &mut bind_values);
        sql.push_str(" ORDER BY 1 ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            values.push(row.get(0)?);
        }
        Ok(values)
    }

    fn bulk_apply(&self, operations: &[BulkOperation]) -> RepoResult<BulkWriteResult> {
        let mut result = BulkWriteResult::default();
        for (index, operation) in operations.iter().enumerate() {
            let tx = self.conn.unchecked_transaction()?;
            let mut modified = 0;
            for id in self.matching_ids(&operation.criteria)? {
                if self.apply_update(&id, &operation.update)? {
                    modified += 1;
                }
            }
            tx.commit()?;

            info!(
                "event=bulk_apply_step module=repo status=ok step={} modified={}",
                index, modified
            );
            result.modified_counts.push(modified);
        }
        Ok(result)
    }
}

fn push_criteria(criteria: &SearchCriteria, sql: &mut String, bind_values: &mut Vec<Value>) {
    if let Some(selector) = criteria.employee.as_ref() {
        sql.push_str(" AND wl.employee_id");
        push_selector(selector, sql, bind_values);
    }

    if let Some(selector) = criteria.project.as_ref() {
        sql.push_str(
            " AND EXISTS (
                SELECT 1
                FROM work_log_tags pt
                WHERE pt.work_log_id = wl.id
                  AND pt.name",
        );
        push_selector(selector, sql, bind_values);
        sql.push(')');
    }

    match criteria.day.as_ref() {
        Some(DayFilter::Exact(day)) => {
            sql.push_str(" AND wl.day = ?");
            bind_values.push(Value::Text(day.clone()));
        }
        Some(DayFilter::Range { from, to }) => {
            if let Some(from) = from {
                sql.push_str(" AND wl.day >= ?");
                bind_values.push(Value::Text(from.clone()));
            }
            if let Some(to) = to {
                sql.push_str(" AND wl.day <= ?");
                bind_values.push(Value::Text(to.clone()));
            }
        }
        Some(filter @ DayFilter::TimeUnits(_)) => {
            if let Some(pattern) = filter.search_pattern() {
                sql.push_str(" AND wl.day REGEXP ?");
                bind_values.push(Value::Text(pattern));
            }
        }
        None => {}
    }
}

fn push_selector(selector: &Selector, sql: &mut String, bind_values: &mut Vec<Value>) {
    match selector {
        Selector::Exact(value) => {
            sql.push_str(" = ?");
            bind_values.push(Value::Text(value.clone()));
        }
        Selector::AnyOf(values) => {
            let placeholders = vec!["?"; values.len()].join(", ");
            sql.push_str(&format!(" IN ({placeholders})"));
            bind_values.extend(values.iter().cloned().map(Value::Text));
        }
    }
}

fn load_tags(conn: &Connection, work_log_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name
         FROM work_log_tags
         WHERE work_log_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([work_log_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
