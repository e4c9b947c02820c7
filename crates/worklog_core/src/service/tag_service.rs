//! Tag listing and preset recommendation service.
//!
//! # Responsibility
//! - List distinct known tags, optionally limited to recent records.
//! - Recommend tag-combination presets from a user's recent history.
//!
//! # Invariants
//! - Every returned combination is sorted alphabetically.
//! - Recent and frequent presets never repeat a combination.
//! - The reference day is always passed in; nothing reads the wall clock.

use crate::config::PresetConfig;
use crate::model::work_log::WorkLogRecord;
use crate::query::criteria::{DayFilter, SearchCriteria, Selector};
use crate::repo::work_log_repo::{DistinctField, RepoResult, WorkLogStore};
use chrono::{Days, NaiveDate};
use log::debug;
use std::collections::HashMap;

/// Tag facade over a record store.
pub struct TagService<S: WorkLogStore> {
    store: S,
    presets: PresetConfig,
}

impl<S: WorkLogStore> TagService<S> {
    /// Creates a service with default preset settings.
    pub fn new(store: S) -> Self {
        Self::with_config(store, PresetConfig::default())
    }

    pub fn with_config(store: S, presets: PresetConfig) -> Self {
        Self { store, presets }
    }

    /// Lists distinct tag names, alphabetically.
    ///
    /// With `date_from`, only records on or after that day are considered.
    pub fn find_all(&self, date_from: Option<NaiveDate>) -> RepoResult<Vec<String>> {
        let criteria = SearchCriteria::compose(None, None, DayFilter::range(date_from, None));
        let mut tags = self.store.distinct(DistinctField::Tag, &criteria)?;
        tags.sort();
        Ok(tags)
    }

    /// Recommends up to `limit` tag combinations for `username`.
    ///
    /// The first half (rounded up) are the most recently used distinct
    /// combinations; the rest are the most frequent ones not already chosen,
    /// ordered by tag list. `limit` falls back to the configured default.
    pub fn find_presets(
        &self,
        username: &str,
        limit: Option<usize>,
        today: NaiveDate,
    ) -> RepoResult<Vec<Vec<String>>> {
        let limit = limit.unwrap_or(self.presets.limit);
        let most_often_limit = limit / 2;
        let most_recent_limit = most_often_limit + limit % 2;

        let since = today
            .checked_sub_days(Days::new(u64::from(self.presets.lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        let criteria = SearchCriteria::compose(
            Selector::exact(Some(username)),
            None,
            DayFilter::range(Some(since), None),
        );
        let mut records = self.store.find(&criteria)?;
        records.sort_by(|a, b| b.day.cmp(&a.day).then(b.created_at.cmp(&a.created_at)));

        let combinations = records
            .iter()
            .filter(|record| !record.tags.is_empty())
            .map(WorkLogRecord::sorted_tags)
            .collect::<Vec<_>>();

        let mut presets = most_recent(&combinations, most_recent_limit);
        let often = most_often(&combinations, &presets, most_often_limit);
        debug!(
            "event=find_presets module=service status=ok records={} recent={} often={}",
            records.len(),
            presets.len(),
            often.len()
        );
        presets.extend(often);
        Ok(presets)
    }
}

fn most_recent(combinations: &[Vec<String>], limit: usize) -> Vec<Vec<String>> {
    let mut chosen: Vec<Vec<String>> = Vec::new();
    for combination in combinations {
        if chosen.len() == limit {
            break;
        }
        if !chosen.contains(combination) {
            chosen.push(combination.clone());
        }
    }
    chosen
}

fn most_often(
    combinations: &[Vec<String>],
    excluded: &[Vec<String>],
    limit: usize,
) -> Vec<Vec<String>> {
    let mut index: HashMap<&[String], usize> = HashMap::new();
    let mut counted: Vec<(&[String], usize)> = Vec::new();
    for combination in combinations {
        match index.get(combination.as_slice()).copied() {
            Some(slot) => counted[slot].1 += 1,
            None => {
                index.insert(combination.as_slice(), counted.len());
                counted.push((combination.as_slice(), 1));
            }
        }
    }
    // Stable: equal counts keep the more recently used combination first.
    counted.sort_by(|a, b| b.1.cmp(&a.1));

    let mut chosen = counted
        .into_iter()
        .map(|(combination, _)| combination)
        .filter(|combination| !excluded.iter().any(|taken| taken.as_slice() == *combination))
        .take(limit)
        .map(<[String]>::to_vec)
        .collect::<Vec<_>>();
    chosen.sort();
    chosen
}

#[cfg(test)]
mod tests {
    use super::{most_often, most_recent};

    fn combo(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|tag| tag.to_string()).collect()
    }

    #[test]
    fn most_recent_deduplicates_in_order() {
        let combinations = vec![combo(&["a"]), combo(&["a"]), combo(&["b"]), combo(&["c"])];
        assert_eq!(
            most_recent(&combinations, 2),
            vec![combo(&["a"]), combo(&["b"])]
        );
        assert!(most_recent(&combinations, 0).is_empty());
    }

    #[test]
    fn most_often_skips_excluded_and_ranks_by_count() {
        let combinations = vec![
            combo(&["x"]),
            combo(&["y"]),
            combo(&["z"]),
            combo(&["z"]),
            combo(&["y"]),
            combo(&["z"]),
        ];
        let chosen = most_often(&combinations, &[combo(&["z"])], 1);
        assert_eq!(chosen, vec![combo(&["y"])]);
    }
}
