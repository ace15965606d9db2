//! Incremental "load more" window over a filtered result list.

use crate::constants::LIST_PAGE_SIZE;

/// Tracks how many filtered items are currently exposed.
///
/// The count starts at one page, grows by exactly one page per
/// [`PaginationWindow::load_more`], and snaps back to one page whenever the
/// observed criteria revision changes. A revision is bumped by every filter
/// setter, so toggling a tag on and back off still resets the window.
#[derive(Debug, Clone)]
pub struct PaginationWindow {
    page_size: usize,
    displayed_items_count: usize,
    last_revision: Option<u64>,
}

impl Default for PaginationWindow {
    fn default() -> Self {
        Self::new(LIST_PAGE_SIZE)
    }
}

impl PaginationWindow {
    /// Create a window with a custom page size (minimum 1).
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            displayed_items_count: page_size,
            last_revision: None,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn displayed_items_count(&self) -> usize {
        self.displayed_items_count
    }

    /// Expose one more page.
    pub fn load_more(&mut self) {
        self.displayed_items_count = self.displayed_items_count.saturating_add(self.page_size);
    }

    /// Go back to the first page.
    pub fn reset(&mut self) {
        self.displayed_items_count = self.page_size;
    }

    /// Apply the reset rule for criteria `revision`.
    ///
    /// # Returns
    /// `true` when `revision` differs from the last observed one and the
    /// window was reset.
    pub fn observe_revision(&mut self, revision: u64) -> bool {
        if self.last_revision == Some(revision) {
            return false;
        }
        let first_observation = self.last_revision.is_none();
        self.last_revision = Some(revision);
        self.reset();
        !first_observation
    }

    /// `true` when more filtered items exist beyond the window.
    pub fn has_more(&self, filtered_len: usize) -> bool {
        filtered_len > self.displayed_items_count
    }

    /// The visible prefix of `items`.
    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..items.len().min(self.displayed_items_count)]
    }
}
