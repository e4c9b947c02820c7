//! Workload expressions (`1d 2h 30m`).
//!
//! A working day counts as 8 hours.

use crate::query::error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;

const MINUTES_PER_HOUR: u32 = 60;
const HOURS_PER_DAY: u32 = 8;

static WORKLOAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([0-9]+)d)?\s?(?:([0-9]+)h)?\s?(?:([0-9]+)m)?$").expect("valid workload regex")
});

/// Converts a `Xd Xh Xm` expression to minutes. At least one group is required.
pub fn parse_workload(expression: &str) -> Result<u32, ParseError> {
    let invalid = || ParseError::InvalidWorkload(expression.to_string());
    let caps = WORKLOAD_RE.captures(expression.trim()).ok_or_else(invalid)?;
    if (1..=3).all(|idx| caps.get(idx).is_none()) {
        return Err(invalid());
    }

    let group = |idx: usize| -> Result<u32, ParseError> {
        caps.get(idx)
            .map_or(Ok(0), |m| m.as_str().parse::<u32>())
            .map_err(|_| invalid())
    };
    let days = group(1)?;
    let hours = group(2)?;
    let minutes = group(3)?;

    days.checked_mul(HOURS_PER_DAY * MINUTES_PER_HOUR)
        .and_then(|total| total.checked_add(hours.checked_mul(MINUTES_PER_HOUR)?))
        .and_then(|total| total.checked_add(minutes))
        .ok_or_else(invalid)
}

/// Renders minutes in canonical `Xd Xh Xm` form, omitting zero groups.
pub fn format_workload(minutes: u32) -> String {
    let per_day = HOURS_PER_DAY * MINUTES_PER_HOUR;
    let days = minutes / per_day;
    let hours = (minutes % per_day) / MINUTES_PER_HOUR;
    let rest = minutes % MINUTES_PER_HOUR;

    let parts = [(days, 'd'), (hours, 'h'), (rest, 'm')]
        .into_iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect::<Vec<_>>();
    if parts.is_empty() {
        "0m".to_string()
    } else {
        parts.join(" ")
    }
}
