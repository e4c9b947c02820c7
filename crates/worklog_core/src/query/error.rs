//! Client-input parse errors shared by the query, expression and workload grammars.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Malformed textual input. Always raised before any store access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Query token without a known selector (`#`, `*`, `@`).
    UnexpectedToken(String),
    /// Selector present but carrying no value (e.g. a bare `#`).
    EmptySelectorValue(String),
    /// Time-unit string is neither `YYYY/MM` nor `YYYY/MM/DD` shaped.
    UnexpectedTimeUnit(String),
    /// Time-unit components are out of range.
    InvalidTimeUnit { value: String, reason: &'static str },
    /// Bulk tag expression does not match the grammar.
    InvalidExpression(String),
    /// Workload expression is not `Xd Xh Xm`.
    InvalidWorkload(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken(token) => write!(f, "unexpected query token: `{token}`"),
            Self::EmptySelectorValue(token) => write!(f, "empty value for selector `{token}`"),
            Self::UnexpectedTimeUnit(value) => write!(f, "unexpected time unit: `{value}`"),
            Self::InvalidTimeUnit { value, reason } => {
                write!(f, "invalid time unit `{value}`: {reason}")
            }
            Self::InvalidExpression(value) => {
                write!(f, "invalid work-log update expression: `{value}`")
            }
            Self::InvalidWorkload(value) => write!(
                f,
                "invalid workload expression `{value}`; valid pattern is `Xd Xh Xm`"
            ),
        }
    }
}

impl Error for ParseError {}
