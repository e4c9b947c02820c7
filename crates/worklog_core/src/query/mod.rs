//! Textual selector and mutation grammars.
//!
//! # Responsibility
//! - Decode user-facing query/expression strings into typed values.
//! - Compose store-agnostic search criteria from those values.
//!
//! # Invariants
//! - Parsing is pure; malformed input fails before any store access.

pub mod criteria;
pub mod error;
pub mod expression;
pub mod language;
pub mod time_unit;

pub use error::ParseError;
