//! Remote sync layer for the training page list.
//!
//! [`TrainingPages`] owns the in-memory record list for one user view and is
//! the only thing that mutates it. Every mutation happens after the backend
//! call resolves: nothing is inserted speculatively, so failures need no
//! rollback.

mod in_flight;

pub use in_flight::{InFlightGuard, InFlightTracker, UpdateSequence, UpdateTicket};

use crate::constants::FETCH_BATCH_SIZE;
use crate::error::SyncError;
use crate::models::envelope::ApiResponse;
use crate::models::page::{
    CreatePageRequest, DateZone, ListPagesQuery, TrainingPageRecord, TrainingPageWithTags,
    TrainingPagesList, UpdatePageRequest,
};
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// User-facing fallback when loading pages fails without a backend message.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to load training pages.";
/// User-facing fallback when creating a page fails without a backend message.
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create the training page.";
/// User-facing fallback when updating a page fails without a backend message.
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update the training page.";
/// User-facing fallback when deleting a page fails without a backend message.
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete the training page.";
/// User-facing message for operations that need a signed-in user.
pub const MISSING_USER_MESSAGE: &str = "You need to be signed in to do that.";
/// User-facing message for a delete repeated while the first is outstanding.
pub const DELETE_IN_PROGRESS_MESSAGE: &str = "That training page is already being deleted.";

/// Backend contract consumed by the sync layer.
///
/// `Err` means the request produced no usable envelope (transport or decode
/// failure); backend-reported failures arrive as [`ApiResponse::Failure`].
pub trait PagesBackend: Send + Sync {
    /// Fetch one window of a user's pages.
    fn get_pages(
        &self,
        query: &ListPagesQuery,
    ) -> impl Future<Output = Result<ApiResponse<TrainingPagesList>, SyncError>> + Send;

    /// Create a page and return its canonical record.
    fn create_page(
        &self,
        request: &CreatePageRequest,
    ) -> impl Future<Output = Result<ApiResponse<TrainingPageWithTags>, SyncError>> + Send;

    /// Replace a page's editable fields and return its canonical record.
    fn update_page(
        &self,
        request: &UpdatePageRequest,
    ) -> impl Future<Output = Result<ApiResponse<TrainingPageWithTags>, SyncError>> + Send;

    /// Delete a page owned by `user_id`.
    fn delete_page(
        &self,
        page_id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<ApiResponse<bool>, SyncError>> + Send;
}

/// Destination for user-visible failure messages.
pub trait AlertSink: Send + Sync {
    fn alert(&self, message: &str);
}

/// Alert sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn alert(&self, message: &str) {
        tracing::warn!(target: "aikinote::alert", "{}", message);
    }
}

fn backend_result<T>(response: ApiResponse<T>, fallback: &str) -> Result<T, SyncError> {
    response.into_result(fallback).map_err(SyncError::Backend)
}

fn alert_message(err: &SyncError, fallback: &str) -> String {
    match err {
        SyncError::Backend(message) => message.clone(),
        SyncError::MissingUser => MISSING_USER_MESSAGE.to_string(),
        SyncError::InFlight { .. } => DELETE_IN_PROGRESS_MESSAGE.to_string(),
        _ => fallback.to_string(),
    }
}

fn non_blank(user_id: Option<&str>) -> Option<&str> {
    user_id.filter(|id| !id.trim().is_empty())
}

/// In-memory training page list synchronized with a [`PagesBackend`].
pub struct TrainingPages<B, A = LogAlerts> {
    backend: B,
    alerts: A,
    zone: DateZone,
    records: Mutex<Vec<TrainingPageRecord>>,
    in_flight: InFlightTracker,
    updates: UpdateSequence,
    generation: AtomicU64,
}

impl<B: PagesBackend> TrainingPages<B, LogAlerts> {
    /// Create an empty list that reports failures through the log only.
    pub fn new(backend: B) -> Self {
        Self::with_alerts(backend, LogAlerts)
    }
}

impl<B: PagesBackend, A: AlertSink> TrainingPages<B, A> {
    /// Create an empty list reporting failures to `alerts`.
    pub fn with_alerts(backend: B, alerts: A) -> Self {
        Self {
            backend,
            alerts,
            zone: DateZone::Local,
            records: Mutex::new(Vec::new()),
            in_flight: InFlightTracker::default(),
            updates: UpdateSequence::default(),
            generation: AtomicU64::new(0),
        }
    }

    /// Use `zone` when turning server timestamps into record dates.
    pub fn with_zone(mut self, zone: DateZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn alerts(&self) -> &A {
        &self.alerts
    }

    pub fn in_flight(&self) -> &InFlightTracker {
        &self.in_flight
    }

    pub fn updates(&self) -> &UpdateSequence {
        &self.updates
    }

    fn lock_records(&self) -> MutexGuard<'_, Vec<TrainingPageRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current list.
    pub fn records(&self) -> Vec<TrainingPageRecord> {
        self.lock_records().clone()
    }

    /// Look up one record by id.
    pub fn get(&self, id: &str) -> Option<TrainingPageRecord> {
        self.lock_records()
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard the results of any fetch still running.
    ///
    /// Call when the consuming view goes away or the signed-in user changes.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn report<T>(&self, operation: &str, fallback: &str, result: Result<T, SyncError>) -> bool {
        match result {
            Ok(_) => true,
            Err(SyncError::Superseded) => {
                tracing::debug!(operation, "discarding superseded result");
                false
            }
            Err(err) => {
                tracing::error!(operation, error = %err, "training page sync failed");
                self.alerts.alert(&alert_message(&err, fallback));
                false
            }
        }
    }

    async fn collect_all_pages(&self, user_id: &str) -> Result<Vec<TrainingPageRecord>, SyncError> {
        let mut records = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut offset = 0;
        loop {
            let query = ListPagesQuery {
                user_id: user_id.to_string(),
                limit: Some(FETCH_BATCH_SIZE),
                offset: Some(offset),
                ..ListPagesQuery::default()
            };
            let batch = backend_result(
                self.backend.get_pages(&query).await?,
                FETCH_FAILED_MESSAGE,
            )?;
            let batch_len = batch.training_pages.len();
            tracing::debug!(offset, batch_len, "fetched training page batch");

            for item in &batch.training_pages {
                // Rows can shift between windows when pages are written mid-fetch.
                if seen.insert(item.page.id.clone()) {
                    records.push(TrainingPageRecord::from_remote(item, self.zone));
                }
            }
            if batch_len != FETCH_BATCH_SIZE {
                break;
            }
            offset += FETCH_BATCH_SIZE;
        }
        Ok(records)
    }

    /// Replace the list with every page of `user_id`.
    ///
    /// On any failure the list is emptied rather than left partial. A fetch
    /// that is superseded by a later fetch or [`TrainingPages::invalidate`]
    /// leaves the list untouched.
    ///
    /// # Returns
    /// Number of records loaded.
    ///
    /// # Errors
    /// Returns the first transport/backend failure, [`SyncError::MissingUser`]
    /// for a blank user id, or [`SyncError::Superseded`].
    pub async fn try_fetch_all(&self, user_id: &str) -> Result<usize, SyncError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = match non_blank(Some(user_id)) {
            Some(user_id) => self.collect_all_pages(user_id).await,
            None => Err(SyncError::MissingUser),
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            return Err(SyncError::Superseded);
        }

        let mut records = self.lock_records();
        match result {
            Ok(loaded) => {
                *records = loaded;
                Ok(records.len())
            }
            Err(err) => {
                records.clear();
                Err(err)
            }
        }
    }

    /// [`TrainingPages::try_fetch_all`], reporting failures to the alert sink.
    pub async fn fetch_all(&self, user_id: &str) -> bool {
        let result = self.try_fetch_all(user_id).await;
        if let Ok(count) = result {
            tracing::info!(count, "loaded training pages");
        }
        self.report("fetch_all", FETCH_FAILED_MESSAGE, result)
    }

    /// Create a page and put the server's record at the front of the list.
    ///
    /// # Errors
    /// Returns the transport/backend failure; the list is unchanged.
    pub async fn try_create(
        &self,
        request: &CreatePageRequest,
    ) -> Result<TrainingPageRecord, SyncError> {
        if non_blank(Some(&request.user_id)).is_none() {
            return Err(SyncError::MissingUser);
        }
        let created = backend_result(
            self.backend.create_page(request).await?,
            CREATE_FAILED_MESSAGE,
        )?;
        let record = TrainingPageRecord::from_remote(&created, self.zone);

        let mut records = self.lock_records();
        records.retain(|existing| existing.id != record.id);
        records.insert(0, record.clone());
        Ok(record)
    }

    /// [`TrainingPages::try_create`], reporting failures to the alert sink.
    pub async fn create(&self, request: CreatePageRequest) -> bool {
        let result = self.try_create(&request).await;
        self.report("create", CREATE_FAILED_MESSAGE, result)
    }

    /// Update a page and replace the matching record in place.
    ///
    /// Records with other ids are untouched; if the id is not in the list,
    /// nothing is inserted. Concurrent updates of one page are all sent, and
    /// only the most recently issued one may change the list, whatever order
    /// the responses arrive in.
    ///
    /// # Errors
    /// Returns the transport/backend failure, or [`SyncError::Superseded`]
    /// when a newer update of the same page was issued while this one was
    /// outstanding. The list is unchanged on error.
    pub async fn try_update(
        &self,
        request: &UpdatePageRequest,
    ) -> Result<TrainingPageRecord, SyncError> {
        if non_blank(Some(&request.user_id)).is_none() {
            return Err(SyncError::MissingUser);
        }
        let ticket = self.updates.issue(&request.id);
        let result = self.backend.update_page(request).await;
        if !ticket.is_latest() {
            tracing::debug!(id = %request.id, seq = ticket.seq(), "newer update issued");
            return Err(SyncError::Superseded);
        }
        let updated = backend_result(result?, UPDATE_FAILED_MESSAGE)?;
        let record = TrainingPageRecord::from_remote(&updated, self.zone);

        let mut records = self.lock_records();
        // Checked again under the list lock so a newer response cannot land first.
        if !ticket.is_latest() {
            return Err(SyncError::Superseded);
        }
        if let Some(slot) = records.iter_mut().find(|existing| existing.id == record.id) {
            *slot = record.clone();
        }
        Ok(record)
    }

    /// [`TrainingPages::try_update`], reporting failures to the alert sink.
    pub async fn update(&self, request: UpdatePageRequest) -> bool {
        let result = self.try_update(&request).await;
        self.report("update", UPDATE_FAILED_MESSAGE, result)
    }

    /// Delete a page and drop it from the list.
    ///
    /// # Errors
    /// Returns [`SyncError::MissingUser`] without contacting the backend when
    /// `user_id` is absent, [`SyncError::InFlight`] while a delete of the same
    /// page is outstanding, or the transport/backend failure. The list is
    /// unchanged on error.
    pub async fn try_remove(&self, page_id: &str, user_id: Option<&str>) -> Result<(), SyncError> {
        let user_id = non_blank(user_id).ok_or(SyncError::MissingUser)?;
        let _guard = self.in_flight.begin(page_id)?;
        let deleted = backend_result(
            self.backend.delete_page(page_id, user_id).await?,
            DELETE_FAILED_MESSAGE,
        )?;
        if !deleted {
            return Err(SyncError::Backend(DELETE_FAILED_MESSAGE.to_string()));
        }
        self.lock_records().retain(|record| record.id != page_id);
        Ok(())
    }

    /// [`TrainingPages::try_remove`], reporting failures to the alert sink.
    pub async fn remove(&self, page_id: &str, user_id: Option<&str>) -> bool {
        let result = self.try_remove(page_id, user_id).await;
        self.report("remove", DELETE_FAILED_MESSAGE, result)
    }
}

#[cfg(test)]
mod tests;
