//! Work-log query language and bulk mutation engine.
//! This crate is the single source of truth for selection and tagging rules.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, PresetConfig};
pub use logging::{default_log_level, init_from_config, init_logging, LoggingError};
pub use model::work_log::{
    format_day, parse_day, WorkLogId, WorkLogRecord, WorkLogValidationError,
};
pub use model::workload::{format_workload, parse_workload};
pub use query::criteria::{DayFilter, SearchCriteria, Selector};
pub use query::error::ParseError;
pub use query::expression::{BulkMutationExpression, TagUpdate};
pub use query::language::WorkLogQuery;
pub use query::time_unit::TimeUnit;
pub use repo::work_log_repo::{
    BulkOperation, BulkWriteResult, DistinctField, RepoError, RepoResult, SqliteWorkLogStore,
    WorkLogStore,
};
pub use service::bulk_service::{BulkMutationService, BulkServiceError, BulkUpdateRequest};
pub use service::tag_service::TagService;
pub use service::work_log_service::WorkLogService;

/// Returns the engine crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
