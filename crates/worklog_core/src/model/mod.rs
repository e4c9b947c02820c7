//! Work-log domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by the query and mutation engine.
//!
//! # Invariants
//! - Every record is identified by a stable `WorkLogId` and owned by one employee.

pub mod work_log;
pub mod workload;
