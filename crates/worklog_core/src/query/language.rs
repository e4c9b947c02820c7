//! Work-log selector language.
//!
//! # Responsibility
//! - Decode the compact (`!project=a+!date=2020:01`) and space-separated
//!   (`#a @2020/01`) selector syntaxes into one [`WorkLogQuery`].
//! - Render a query back into compact form.
//!
//! # Invariants
//! - Empty input parses to an all-empty query, which matches every record.
//! - Every token carries a known selector and a non-empty value.

use crate::query::criteria::{DayFilter, SearchCriteria, Selector};
use crate::query::error::ParseError;
use crate::query::time_unit::TimeUnit;

const PROJECT_SELECTOR: char = '#';
const EMPLOYEE_SELECTOR: char = '*';
const TIME_UNIT_SELECTOR: char = '@';

/// Structured selection over employees, project tags and time units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkLogQuery {
    pub employees: Vec<String>,
    pub projects: Vec<String>,
    pub time_units: Vec<TimeUnit>,
}

impl WorkLogQuery {
    /// Parses the space-separated form (`#tag *employee @2020/01[/02]`).
    pub fn parse(expression: &str) -> Result<Self, ParseError> {
        let mut query = Self::default();
        let mut raw_time_units = Vec::new();

        for token in expression.split_whitespace() {
            let mut chars = token.chars();
            let selector = chars.next();
            let value = chars.as_str();
            let bucket = match selector {
                Some(PROJECT_SELECTOR) => &mut query.projects,
                Some(EMPLOYEE_SELECTOR) => &mut query.employees,
                Some(TIME_UNIT_SELECTOR) => &mut raw_time_units,
                _ => return Err(ParseError::UnexpectedToken(token.to_string())),
            };
            if value.is_empty() {
                return Err(ParseError::EmptySelectorValue(token.to_string()));
            }
            bucket.push(value.to_string());
        }

        query.time_units = raw_time_units
            .iter()
            .map(|value| TimeUnit::parse(value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(query)
    }

    /// Parses the compact URL form by rewriting it into the space-separated form.
    ///
    /// Space-separated input passes through unchanged unless it contains `+` or `:`.
    pub fn from_query_string(query: &str) -> Result<Self, ParseError> {
        Self::parse(&decode_query_string(query))
    }

    /// Renders the compact form accepted by [`WorkLogQuery::from_query_string`].
    pub fn to_query_string(&self) -> String {
        let employees = self.employees.iter().map(|id| format!("!employee={id}"));
        let projects = self.projects.iter().map(|name| format!("!project={name}"));
        let dates = self
            .time_units
            .iter()
            .map(|unit| format!("!date={}", unit.to_string().replace('/', ":")));
        employees
            .chain(projects)
            .chain(dates)
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Returns whether the query constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty() && self.projects.is_empty() && self.time_units.is_empty()
    }

    /// Composes store criteria; empty dimensions stay unconstrained.
    pub fn to_search_criteria(&self) -> SearchCriteria {
        SearchCriteria::compose(
            Selector::any_of(&self.employees),
            Selector::any_of(&self.projects),
            DayFilter::time_units(&self.time_units),
        )
    }
}

fn decode_query_string(query: &str) -> String {
    query
        .replace("!project=", "#")
        .replace("!employee=", "*")
        .replace("!date=", "@")
        .replace('+', " ")
        .replace(':', "/")
}

#[cfg(test)]
mod tests {
    use super::{decode_query_string, WorkLogQuery};
    use crate::query::error::ParseError;
    use crate::query::time_unit::TimeUnit;

    #[test]
    fn decodes_compact_form() {
        assert_eq!(
            decode_query_string("!project=nvm+!employee=john.doe+!date=2019:04:02"),
            "#nvm *john.doe @2019/04/02"
        );
    }

    #[test]
    fn parses_both_syntaxes_to_same_query() {
        let compact =
            WorkLogQuery::from_query_string("!project=nvm+!employee=john.doe+!date=2019:04")
                .unwrap();
        let spaced = WorkLogQuery::parse("#nvm *john.doe @2019/04").unwrap();
        assert_eq!(compact, spaced);
        assert_eq!(compact.projects, vec!["nvm"]);
        assert_eq!(compact.employees, vec!["john.doe"]);
        assert_eq!(
            compact.time_units,
            vec![TimeUnit::year_month(2019, 4).unwrap()]
        );
    }

    #[test]
    fn empty_input_is_unconstrained() {
        assert!(WorkLogQuery::from_query_string("").unwrap().is_empty());
        assert!(WorkLogQuery::parse("   ").unwrap().is_empty());
        assert!(WorkLogQuery::default()
            .to_search_criteria()
            .is_unconstrained());
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(matches!(
            WorkLogQuery::parse("#nvm project"),
            Err(ParseError::UnexpectedToken(_))
        ));
        assert!(matches!(
            WorkLogQuery::parse("# *john"),
            Err(ParseError::EmptySelectorValue(_))
        ));
        assert!(matches!(
            WorkLogQuery::from_query_string("!date=2019"),
            Err(ParseError::UnexpectedTimeUnit(_))
        ));
        assert!(matches!(
            WorkLogQuery::from_query_string("!date=2019:13"),
            Err(ParseError::InvalidTimeUnit { .. })
        ));
    }

    #[test]
    fn renders_compact_form() {
        let query = WorkLogQuery {
            employees: vec!["a".into()],
            projects: vec!["p".into()],
            time_units: vec![TimeUnit::year_month_day(2020, 1, 2).unwrap()],
        };
        assert_eq!(query.to_query_string(), "!employee=a+!project=p+!date=2020:01:02");
    }
}
