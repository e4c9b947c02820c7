//! Calendar granularities used to match records by day.
//!
//! # Invariants
//! - `year` is within `1..=9999` and `month` within `1..=12`.
//! - `YearMonthDay` always denotes a real calendar date.
//! - Patterns are rendered zero-padded so they line up with stored days.

use crate::query::error::ParseError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

static YEAR_MONTH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})/(\d{2})/(\d{2})$").expect("valid year-month-day regex")
});
static YEAR_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})/(\d{2})$").expect("valid year-month regex"));

/// A month, or one specific day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    YearMonth { year: u16, month: u8 },
    YearMonthDay { year: u16, month: u8, day: u8 },
}

impl TimeUnit {
    /// Builds a whole-month unit.
    pub fn year_month(year: u16, month: u8) -> Result<Self, ParseError> {
        validate_year_month(year, month)?;
        Ok(Self::YearMonth { year, month })
    }

    /// Builds a single-day unit.
    pub fn year_month_day(year: u16, month: u8, day: u8) -> Result<Self, ParseError> {
        validate_year_month(year, month)?;
        if NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day)).is_none() {
            return Err(ParseError::InvalidTimeUnit {
                value: format!("{year:04}/{month:02}/{day:02}"),
                reason: "day does not exist in month",
            });
        }
        Ok(Self::YearMonthDay { year, month, day })
    }

    /// Parses `YYYY/MM/DD` or `YYYY/MM`.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        if let Some(caps) = YEAR_MONTH_DAY_RE.captures(value) {
            return Self::year_month_day(
                parse_component(value, &caps[1])?,
                parse_component(value, &caps[2])?,
                parse_component(value, &caps[3])?,
            );
        }
        if let Some(caps) = YEAR_MONTH_RE.captures(value) {
            return Self::year_month(
                parse_component(value, &caps[1])?,
                parse_component(value, &caps[2])?,
            );
        }
        Err(ParseError::UnexpectedTimeUnit(value.to_string()))
    }

    /// Unanchored regular expression matching stored `day` values.
    ///
    /// A month matches any two-digit day within it.
    pub fn search_pattern(&self) -> String {
        match self {
            Self::YearMonth { year, month } => format!(r"{year:04}/{month:02}/(\d{{2}})"),
            Self::YearMonthDay { year, month, day } => format!("{year:04}/{month:02}/{day:02}"),
        }
    }

    /// Whether a stored `YYYY/MM/DD` day falls within this unit.
    pub fn contains_day(&self, day: &str) -> bool {
        match self {
            Self::YearMonth { .. } => day
                .strip_prefix(&format!("{self}/"))
                .is_some_and(|rest| rest.len() == 2 && rest.bytes().all(|b| b.is_ascii_digit())),
            Self::YearMonthDay { .. } => day == self.to_string(),
        }
    }
}

impl Display for TimeUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::YearMonth { year, month } => write!(f, "{year:04}/{month:02}"),
            Self::YearMonthDay { year, month, day } => write!(f, "{year:04}/{month:02}/{day:02}"),
        }
    }
}

fn validate_year_month(year: u16, month: u8) -> Result<(), ParseError> {
    if !(1..=9999).contains(&year) {
        return Err(ParseError::InvalidTimeUnit {
            value: format!("{year:04}/{month:02}"),
            reason: "year must be within 1..=9999",
        });
    }
    if !(1..=12).contains(&month) {
        return Err(ParseError::InvalidTimeUnit {
            value: format!("{year:04}/{month:02}"),
            reason: "month must be within 1..=12",
        });
    }
    Ok(())
}

fn parse_component<T: std::str::FromStr>(value: &str, digits: &str) -> Result<T, ParseError> {
    digits
        .parse::<T>()
        .map_err(|_| ParseError::UnexpectedTimeUnit(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::TimeUnit;
    use crate::query::error::ParseError;

    #[test]
    fn year_month_bounds() {
        assert!(TimeUnit::year_month(2020, 0).is_err());
        assert!(TimeUnit::year_month(2020, 13).is_err());
        assert!(TimeUnit::year_month(2020, 1).is_ok());
        assert!(TimeUnit::year_month(2020, 12).is_ok());
        assert!(TimeUnit::year_month(0, 5).is_err());
    }

    #[test]
    fn parse_picks_variant_by_shape() {
        assert_eq!(
            TimeUnit::parse("2019/04/30").unwrap(),
            TimeUnit::YearMonthDay {
                year: 2019,
                month: 4,
                day: 30
            }
        );
        assert_eq!(
            TimeUnit::parse("2019/04").unwrap(),
            TimeUnit::YearMonth {
                year: 2019,
                month: 4
            }
        );
        assert!(matches!(
            TimeUnit::parse("2019-04"),
            Err(ParseError::UnexpectedTimeUnit(_))
        ));
        assert!(matches!(
            TimeUnit::parse("2019/4"),
            Err(ParseError::UnexpectedTimeUnit(_))
        ));
        assert!(matches!(
            TimeUnit::parse("2019/02/31"),
            Err(ParseError::InvalidTimeUnit { .. })
        ));
    }

    #[test]
    fn patterns_are_zero_padded() {
        let month = TimeUnit::year_month(2020, 3).unwrap();
        assert_eq!(month.search_pattern(), r"2020/03/(\d{2})");
        let day = TimeUnit::year_month_day(2020, 3, 7).unwrap();
        assert_eq!(day.search_pattern(), "2020/03/07");
        assert_eq!(month.to_string(), "2020/03");
    }

    #[test]
    fn contains_day_respects_granularity() {
        let month = TimeUnit::year_month(2020, 3).unwrap();
        assert!(month.contains_day("2020/03/07"));
        assert!(!month.contains_day("2020/04/07"));
        assert!(!month.contains_day("2020/03"));
        let day = TimeUnit::year_month_day(2020, 3, 7).unwrap();
        assert!(day.contains_day("2020/03/07"));
        assert!(!day.contains_day("2020/03/08"));
    }
}
