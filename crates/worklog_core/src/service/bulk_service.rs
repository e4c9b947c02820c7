//! Bulk tag mutation use-case service.
//!
//! # Responsibility
//! - Count records matched by a query (dry run).
//! - Apply add/remove tag expressions to every matched record.
//! - Enforce that callers only modify records they own.
//!
//! # Invariants
//! - Parse failures abort before any store access.
//! - Authorization runs before mutation; an empty match set passes vacuously.
//! - The add phase always runs before the remove phase, so a tag present in
//!   both sets ends up removed.
//!
//! # Known limitations
//! - The two phases are separate store operations. A failure between them
//!   leaves tags added but not removed; nothing rolls back.
//! - Ownership is not re-checked atomically with the write.
//! - The returned count is the remove phase's modified count only.

use crate::query::error::ParseError;
use crate::query::expression::BulkMutationExpression;
use crate::query::language::WorkLogQuery;
use crate::repo::work_log_repo::{BulkOperation, DistinctField, RepoError, WorkLogStore};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for bulk use-cases.
#[derive(Debug)]
pub enum BulkServiceError {
    /// Malformed query or expression.
    Parse(ParseError),
    /// Caller does not own every matched record.
    Forbidden { user: String },
    /// Store failure, propagated unchanged.
    Store(RepoError),
}

impl Display for BulkServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Forbidden { user } => write!(
                f,
                "user `{user}` can't modify entries created by other users"
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BulkServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Forbidden { .. } => None,
        }
    }
}

impl From<ParseError> for BulkServiceError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<RepoError> for BulkServiceError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// Bulk update request: a space-separated query (`#tag *employee @2020/01`)
/// plus a tag expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkUpdateRequest {
    pub query: String,
    pub expression: String,
}

/// Bulk mutation facade over a record store.
pub struct BulkMutationService<S: WorkLogStore> {
    store: S,
}

impl<S: WorkLogStore> BulkMutationService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns how many records the compact-form query currently matches.
    /// Never mutates.
    pub fn validate_query(&self, query_string: &str) -> Result<usize, BulkServiceError> {
        let query = WorkLogQuery::from_query_string(query_string)?;
        let matched = self.store.find(&query.to_search_criteria())?.len();
        info!(
            "event=bulk_validate module=service status=ok matched={}",
            matched
        );
        Ok(matched)
    }

    /// Applies the expression to every record matched by the query.
    ///
    /// The query is read verbatim in space-separated form; `+` and `:` stay
    /// part of tag names. Returns the remove phase's modified count.
    pub fn bulk_update(
        &self,
        request: &BulkUpdateRequest,
        authenticated_user_id: &str,
    ) -> Result<usize, BulkServiceError> {
        let query = WorkLogQuery::parse(&request.query)?;
        let expression = BulkMutationExpression::parse(&request.expression)?;
        let criteria = query.to_search_criteria();

        let owners = self.store.distinct(DistinctField::Employee, &criteria)?;
        if !owners.iter().all(|owner| owner == authenticated_user_id) {
            warn!(
                "event=bulk_update module=service status=forbidden owners={}",
                owners.len()
            );
            return Err(BulkServiceError::Forbidden {
                user: authenticated_user_id.to_string(),
            });
        }

        let operations = [
            BulkOperation {
                criteria: criteria.clone(),
                update: expression.add_update(),
            },
            BulkOperation {
                criteria,
                update: expression.remove_update(),
            },
        ];
        let result = self.store.bulk_apply(&operations)?;

        info!(
            "event=bulk_update module=service status=ok add_tags={} remove_tags={} modified_counts={:?}",
            expression.tags_to_add().len(),
            expression.tags_to_remove().len(),
            result.modified_counts
        );
        Ok(result.last_modified())
    }
}
