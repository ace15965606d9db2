//! Per-record bookkeeping for outstanding sync requests.
//!
//! Deletes are de-duplicated: a second delete of the same page while the
//! first is outstanding is rejected. Updates are sequenced instead: every
//! update is sent, and only the response to the most recently issued update
//! of a page may touch the list.

use crate::error::SyncError;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Set of page ids with a delete outstanding.
#[derive(Debug, Default)]
pub struct InFlightTracker {
    inner: Mutex<HashSet<String>>,
}

/// Guard marking one page's delete as outstanding.
///
/// While alive, [`InFlightTracker::begin`] rejects the same id.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    tracker: &'a InFlightTracker,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.tracker.state().remove(&self.id);
    }
}

impl InFlightTracker {
    fn state(&self) -> MutexGuard<'_, HashSet<String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the delete of `id` as outstanding.
    ///
    /// # Returns
    /// A guard that clears the mark when dropped.
    ///
    /// # Errors
    /// Returns [`SyncError::InFlight`] when a delete of `id` is already outstanding.
    pub fn begin(&self, id: &str) -> Result<InFlightGuard<'_>, SyncError> {
        if !self.state().insert(id.to_string()) {
            return Err(SyncError::InFlight { id: id.to_string() });
        }
        Ok(InFlightGuard {
            tracker: self,
            id: id.to_string(),
        })
    }

    /// `true` while a delete of `id` is outstanding.
    pub fn is_in_flight(&self, id: &str) -> bool {
        self.state().contains(id)
    }

    pub fn len(&self) -> usize {
        self.state().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Latest-issued update sequence number per page id.
#[derive(Debug, Default)]
pub struct UpdateSequence {
    next: AtomicU64,
    latest: Mutex<HashMap<String, u64>>,
}

/// One issued update. Dropping it forgets the page once no newer update exists.
#[derive(Debug)]
pub struct UpdateTicket<'a> {
    sequence: &'a UpdateSequence,
    id: String,
    seq: u64,
}

impl UpdateTicket<'_> {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// `true` when no update of the same page was issued after this one.
    pub fn is_latest(&self) -> bool {
        self.sequence.latest(&self.id) == Some(self.seq)
    }
}

impl Drop for UpdateTicket<'_> {
    fn drop(&mut self) {
        let mut latest = self.sequence.state();
        if latest.get(&self.id) == Some(&self.seq) {
            latest.remove(&self.id);
        }
    }
}

impl UpdateSequence {
    fn state(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a ticket for an update of `id`, making it the latest one.
    pub fn issue(&self, id: &str) -> UpdateTicket<'_> {
        let seq = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        self.state().insert(id.to_string(), seq);
        UpdateTicket {
            sequence: self,
            id: id.to_string(),
            seq,
        }
    }

    /// Sequence number of the newest outstanding update of `id`.
    pub fn latest(&self, id: &str) -> Option<u64> {
        self.state().get(id).copied()
    }

    /// Number of pages with an update outstanding.
    pub fn len(&self) -> usize {
        self.state().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
