//! Bulk tag mutation expressions (`+#done -#in-progress`).
//!
//! # Invariants
//! - The whole input is validated in one check; no partial parse is returned.
//! - `tags_to_add` and `tags_to_remove` keep first-occurrence order without duplicates.
//! - Empty tag names are never produced.

use crate::query::error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static EXPRESSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\+#\S*|-#\S*)(\+#\S*|-#\S*|\s)*$").expect("valid expression regex")
});
static ADD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+#(\S*)").expect("valid add regex"));
static REMOVE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-#(\S*)").expect("valid remove regex"));

/// Update fragment applied to the tag set of every matched record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagUpdate {
    /// Append each tag not already present, in order. Idempotent.
    AddToSet(Vec<String>),
    /// Remove every tag that is a member of the list.
    Pull(Vec<String>),
}

impl TagUpdate {
    /// Applies the fragment in place; returns whether the tag set changed.
    pub fn apply(&self, tags: &mut Vec<String>) -> bool {
        match self {
            Self::AddToSet(to_add) => {
                let before = tags.len();
                for tag in to_add {
                    if !tags.contains(tag) {
                        tags.push(tag.clone());
                    }
                }
                tags.len() != before
            }
            Self::Pull(to_remove) => {
                let before = tags.len();
                tags.retain(|tag| !to_remove.contains(tag));
                tags.len() != before
            }
        }
    }
}

/// Decoded add/remove tag sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkMutationExpression {
    tags_to_add: Vec<String>,
    tags_to_remove: Vec<String>,
}

impl BulkMutationExpression {
    /// Validates and decodes an expression.
    pub fn parse(expression: &str) -> Result<Self, ParseError> {
        if !EXPRESSION_RE.is_match(expression) {
            return Err(ParseError::InvalidExpression(expression.to_string()));
        }
        Ok(Self {
            tags_to_add: extract_unique(&ADD_RE, expression),
            tags_to_remove: extract_unique(&REMOVE_RE, expression),
        })
    }

    pub fn tags_to_add(&self) -> &[String] {
        &self.tags_to_add
    }

    pub fn tags_to_remove(&self) -> &[String] {
        &self.tags_to_remove
    }

    pub fn add_update(&self) -> TagUpdate {
        TagUpdate::AddToSet(self.tags_to_add.clone())
    }

    pub fn remove_update(&self) -> TagUpdate {
        TagUpdate::Pull(self.tags_to_remove.clone())
    }
}

fn extract_unique(pattern: &Regex, expression: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    pattern
        .captures_iter(expression)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(*tag))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{BulkMutationExpression, TagUpdate};
    use crate::query::error::ParseError;

    #[test]
    fn parses_add_and_remove_sets() {
        let parsed = BulkMutationExpression::parse("+#projects -#in-progress +#done").unwrap();
        assert_eq!(parsed.tags_to_add(), ["projects", "done"]);
        assert_eq!(parsed.tags_to_remove(), ["in-progress"]);
    }

    #[test]
    fn ignores_duplicates_keeping_first_occurrence() {
        let parsed = BulkMutationExpression::parse("+#a -#b +#a -#b").unwrap();
        assert_eq!(parsed.tags_to_add(), ["a"]);
        assert_eq!(parsed.tags_to_remove(), ["b"]);
    }

    #[test]
    fn rejects_whole_expression_on_any_bad_token() {
        for invalid in [
            "+#a b",
            "++#a",
            "",
            "#a",
            "+#projects in-progress +#done +#projects --#in-progress",
        ] {
            assert!(
                matches!(
                    BulkMutationExpression::parse(invalid),
                    Err(ParseError::InvalidExpression(_))
                ),
                "`{invalid}` should be rejected"
            );
        }
        assert!(BulkMutationExpression::parse("+#a -#b").is_ok());
    }

    #[test]
    fn shared_tags_appear_in_both_sets() {
        let parsed = BulkMutationExpression::parse("+#c -#c").unwrap();
        assert_eq!(parsed.tags_to_add(), ["c"]);
        assert_eq!(parsed.tags_to_remove(), ["c"]);
    }

    #[test]
    fn bare_selectors_yield_no_tags() {
        let parsed = BulkMutationExpression::parse("+# -#x").unwrap();
        assert!(parsed.tags_to_add().is_empty());
        assert_eq!(parsed.tags_to_remove(), ["x"]);
    }

    #[test]
    fn fragments_report_changes() {
        let mut tags = vec!["a".to_string(), "b".to_string()];
        assert!(!TagUpdate::AddToSet(vec!["a".into()]).apply(&mut tags));
        assert!(TagUpdate::AddToSet(vec!["c".into(), "a".into()]).apply(&mut tags));
        assert_eq!(tags, ["a", "b", "c"]);
        assert!(TagUpdate::Pull(vec!["a".into(), "z".into()]).apply(&mut tags));
        assert_eq!(tags, ["b", "c"]);
        assert!(!TagUpdate::Pull(vec![]).apply(&mut tags));
    }
}
