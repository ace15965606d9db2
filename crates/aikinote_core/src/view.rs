//! View-side state for the training page list.
//!
//! [`PageListView`] owns everything the list screen needs besides the records
//! themselves: raw and debounced search text, tag/date selection, the
//! pagination window, and dialog state. Records stay owned by the sync layer
//! and are only read here.

use crate::constants::{LIST_PAGE_SIZE, SEARCH_DEBOUNCE_MS};
use crate::debounce::Debouncer;
use crate::filter::{self, FilterCriteria};
use crate::modal::ModalState;
use crate::models::page::TrainingPageRecord;
use crate::pagination::PaginationWindow;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Visible slice of a filtered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisiblePage {
    pub items: Vec<TrainingPageRecord>,
    /// Number of records passing the filter.
    pub filtered_len: usize,
    pub has_more: bool,
}

/// List screen state.
#[derive(Debug, Clone)]
pub struct PageListView {
    search: Debouncer<String>,
    selected_tags: BTreeSet<String>,
    selected_date: Option<NaiveDate>,
    pagination: PaginationWindow,
    /// Bumped by every change to the filter inputs.
    criteria_revision: u64,
    pub modals: ModalState,
}

impl Default for PageListView {
    fn default() -> Self {
        Self::new(Duration::from_millis(SEARCH_DEBOUNCE_MS), LIST_PAGE_SIZE)
    }
}

impl PageListView {
    pub fn new(search_delay: Duration, page_size: usize) -> Self {
        Self {
            search: Debouncer::new(String::new(), search_delay),
            selected_tags: BTreeSet::new(),
            selected_date: None,
            pagination: PaginationWindow::new(page_size),
            criteria_revision: 0,
            modals: ModalState::default(),
        }
    }

    /// Text currently in the search box.
    pub fn search_input(&self) -> &str {
        self.search.latest()
    }

    /// Search text the filter is using.
    pub fn search_query(&self) -> &str {
        self.search.value()
    }

    /// Record a keystroke in the search box.
    pub fn set_search_input(&mut self, input: impl Into<String>, now: Instant) {
        self.search.set(input.into(), now);
    }

    /// Apply the search text immediately (e.g. on Enter).
    pub fn commit_search(&mut self) -> bool {
        let changed = self.search.flush();
        self.note_change(changed)
    }

    /// Advance the debounce clock.
    ///
    /// # Returns
    /// `true` when the debounced query changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let changed = self.search.poll(now);
        self.note_change(changed)
    }

    fn note_change(&mut self, changed: bool) -> bool {
        if changed {
            self.criteria_revision = self.criteria_revision.wrapping_add(1);
        }
        changed
    }

    /// Number of filter changes so far; any change resets pagination.
    pub fn criteria_revision(&self) -> u64 {
        self.criteria_revision
    }

    /// When the next [`PageListView::tick`] may change anything.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.search.deadline()
    }

    pub fn selected_tags(&self) -> &BTreeSet<String> {
        &self.selected_tags
    }

    /// Add `tag` to the selection, or remove it if already selected.
    pub fn toggle_tag(&mut self, tag: &str) {
        if !self.selected_tags.remove(tag) {
            self.selected_tags.insert(tag.to_string());
        }
        self.note_change(true);
    }

    pub fn clear_tags(&mut self) {
        self.selected_tags.clear();
        self.note_change(true);
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.selected_date = date;
        self.note_change(true);
    }

    /// Drop every criterion, including a search still waiting on the debounce.
    pub fn clear_filters(&mut self, now: Instant) {
        self.search.set(String::new(), now);
        self.search.flush();
        self.selected_tags.clear();
        self.selected_date = None;
        self.note_change(true);
    }

    /// Criteria the filter engine runs with right now.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search_query: self.search.value().clone(),
            selected_date: self.selected_date,
            selected_tags: self.selected_tags.clone(),
        }
    }

    pub fn pagination(&self) -> &PaginationWindow {
        &self.pagination
    }

    /// Show one more page.
    pub fn load_more(&mut self) {
        self.pagination.load_more();
    }

    /// Filter `records` and window the result.
    ///
    /// Resets to the first page when any filter input changed since the
    /// previous call, even if it was changed back.
    pub fn visible(&mut self, records: &[TrainingPageRecord]) -> VisiblePage {
        let criteria = self.criteria();
        self.pagination.observe_revision(self.criteria_revision);
        let filtered = filter::filter_records(records, &criteria);
        VisiblePage {
            items: self.pagination.visible(&filtered).to_vec(),
            filtered_len: filtered.len(),
            has_more: self.pagination.has_more(filtered.len()),
        }
    }

    /// Tag names offered by the tag filter.
    pub fn available_tags(&self, records: &[TrainingPageRecord]) -> Vec<String> {
        filter::available_tags(records)
    }

    /// Open the edit dialog for the record with `id`.
    ///
    /// # Returns
    /// `false` if no such record exists.
    pub fn edit(&mut self, records: &[TrainingPageRecord], id: &str) -> bool {
        match records.iter().find(|record| record.id == id) {
            Some(record) => {
                self.modals.open_edit(record.clone());
                true
            }
            None => false,
        }
    }
}
