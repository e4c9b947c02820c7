//! Engine use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep transport layers decoupled from storage details.

pub mod bulk_service;
pub mod tag_service;
pub mod work_log_service;
