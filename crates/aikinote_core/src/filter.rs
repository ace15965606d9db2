//! Pure filtering over the fetched training page list.
//!
//! Three independent predicates are AND-combined: free text, tag set, and
//! exact date. Input order is preserved and inputs are never mutated.

use crate::models::page::TrainingPageRecord;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Criteria consumed by [`filter_records`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Already-debounced search text.
    pub search_query: String,
    pub selected_date: Option<NaiveDate>,
    /// Tag names a record must all carry. Empty means no constraint.
    pub selected_tags: BTreeSet<String>,
}

impl FilterCriteria {
    /// `true` when no stage would narrow anything.
    pub fn is_empty(&self) -> bool {
        self.search_query.trim().is_empty()
            && self.selected_date.is_none()
            && self.selected_tags.is_empty()
    }

    /// Builder-style helper used by the backend and tests.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    /// Builder-style helper used by the backend and tests.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style helper used by the backend and tests.
    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.selected_date = date;
        self
    }
}

/// Case-insensitive substring match against title, content, and comment.
///
/// A blank query matches everything.
pub fn matches_text(record: &TrainingPageRecord, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    [&record.title, &record.content, &record.comment]
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// `true` when the record carries every selected tag (exact name match).
pub fn matches_tags(record: &TrainingPageRecord, selected: &BTreeSet<String>) -> bool {
    selected
        .iter()
        .all(|wanted| record.tags.iter().any(|tag| tag == wanted))
}

/// `true` when no date is selected or the record falls on it.
pub fn matches_date(record: &TrainingPageRecord, selected: Option<NaiveDate>) -> bool {
    selected.map_or(true, |date| record.date == date)
}

/// `true` when `record` passes every stage of `criteria`.
pub fn matches(record: &TrainingPageRecord, criteria: &FilterCriteria) -> bool {
    matches_text(record, &criteria.search_query)
        && matches_tags(record, &criteria.selected_tags)
        && matches_date(record, criteria.selected_date)
}

/// Narrow `records` by `criteria`, preserving source order.
pub fn filter_records(
    records: &[TrainingPageRecord],
    criteria: &FilterCriteria,
) -> Vec<TrainingPageRecord> {
    records
        .iter()
        .filter(|record| matches(record, criteria))
        .cloned()
        .collect()
}

/// Distinct tag names across `records`, sorted, for the tag filter picker.
pub fn available_tags(records: &[TrainingPageRecord]) -> Vec<String> {
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for record in records {
        names.extend(record.tags.iter().map(String::as_str));
    }
    names.into_iter().map(str::to_string).collect()
}
