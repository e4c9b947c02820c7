//! Record store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contract the engine services consume.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Store writes enforce `WorkLogRecord::validate()` before persistence.
//! - Store APIs return storage errors unchanged; no retries happen here.

pub mod work_log_repo;
