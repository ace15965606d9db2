//! Page storage operations backed by redb.

use crate::db::tables::{PAGES, PAGES_BY_CREATED};
use crate::db::tag::register_tags;
use crate::error::AppError;
use crate::models::page::*;
use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

pub(crate) fn reverse_timestamp_key(created_at: DateTime<Utc>) -> u64 {
    // Pre-epoch timestamps are clamped so the key never underflows.
    let millis = created_at.timestamp_millis().max(0) as u64;
    u64::MAX.saturating_sub(millis)
}

pub(crate) fn deserialize_page(bytes: &[u8]) -> Result<TrainingPageWithTags, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

fn apply_update_request(page: &mut TrainingPageWithTags, update: &UpdatePageRequest) {
    page.page.title = update.title.trim().to_string();
    page.page.content = update.content.clone();
    page.page.comment = update.comment.clone();
    page.tags = update.page_tags();
    page.page.updated_at = Utc::now();
}

/// Accessor for page tables.
pub struct PageDb {
    db: Arc<redb::Database>,
}

impl PageDb {
    /// Initialize page tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PAGES)?;
        write_txn.open_table(PAGES_BY_CREATED)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert a new page from `request` and register its tags atomically.
    ///
    /// # Returns
    /// The stored canonical record.
    ///
    /// # Errors
    /// Returns an error when serialization or storage operations fail.
    pub fn create(&self, request: &CreatePageRequest) -> Result<TrainingPageWithTags, AppError> {
        let stored = TrainingPageWithTags {
            page: TrainingPage::new(
                request.user_id.clone(),
                request.title.trim().to_string(),
                request.content.clone(),
                request.comment.clone(),
            ),
            tags: request.page_tags(),
        };
        self.insert(&stored)?;
        Ok(stored)
    }

    /// Insert an already-built page row and register its tags atomically.
    ///
    /// # Errors
    /// Returns an error when the id already exists, or on storage failure.
    pub fn insert(&self, stored: &TrainingPageWithTags) -> Result<(), AppError> {
        let id = stored.page.id.as_str();
        let encoded = bincode::serialize(stored)?;
        let created_key = reverse_timestamp_key(stored.page.created_at);

        let write_txn = self.db.begin_write()?;
        {
            let mut pages = write_txn.open_table(PAGES)?;
            let mut by_created = write_txn.open_table(PAGES_BY_CREATED)?;

            if pages.get(id)?.is_some() {
                return Err(AppError::StorageMessage(format!(
                    "Page id '{}' already exists",
                    id
                )));
            }

            pages.insert(id, encoded.as_slice())?;
            by_created.insert((created_key, id), ())?;
        }
        register_tags(&write_txn, &stored.page.user_id, &stored.tags)?;
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a page by id, regardless of owner.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &str) -> Result<Option<TrainingPageWithTags>, AppError> {
        let read_txn = self.db.begin_read()?;
        let pages = read_txn.open_table(PAGES)?;
        match pages.get(id)? {
            Some(value) => Ok(Some(deserialize_page(value.value())?)),
            None => Ok(None),
        }
    }

    /// Fetch page `id` only if it belongs to `user_id`.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get_owned(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<TrainingPageWithTags>, AppError> {
        Ok(self.get(id)?.filter(|page| page.page.user_id == user_id))
    }

    /// Replace the editable fields of a page owned by `update.user_id`.
    ///
    /// # Returns
    /// `Ok(Some(page))` when updated, `Ok(None)` when missing or owned by
    /// someone else.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn update(
        &self,
        update: &UpdatePageRequest,
    ) -> Result<Option<TrainingPageWithTags>, AppError> {
        let id = update.id.as_str();
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut pages = write_txn.open_table(PAGES)?;
            let Some(old_guard) = pages.get(id)? else {
                return Ok(None);
            };
            let mut page = deserialize_page(old_guard.value())?;
            drop(old_guard);
            if page.page.user_id != update.user_id {
                return Ok(None);
            }

            apply_update_request(&mut page, update);
            let encoded = bincode::serialize(&page)?;
            pages.insert(id, encoded.as_slice())?;
            page
        };
        register_tags(&write_txn, &updated.page.user_id, &updated.tags)?;
        write_txn.commit()?;
        Ok(Some(updated))
    }

    /// Delete page `id` owned by `user_id`.
    ///
    /// # Returns
    /// `true` when a row was deleted, `false` when missing or not owned.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn delete(&self, id: &str, user_id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut pages = write_txn.open_table(PAGES)?;
            let mut by_created = write_txn.open_table(PAGES_BY_CREATED)?;

            let Some(old_guard) = pages.get(id)? else {
                return Ok(false);
            };
            let page = deserialize_page(old_guard.value())?;
            drop(old_guard);
            if page.page.user_id != user_id {
                return Ok(false);
            }

            let created_key = reverse_timestamp_key(page.page.created_at);
            let _ = by_created.remove((created_key, id))?;
            let _ = pages.remove(id)?;
        }
        write_txn.commit()?;
        Ok(true)
    }

    /// All pages of `user_id`, newest first.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<TrainingPageWithTags>, AppError> {
        let read_txn = self.db.begin_read()?;
        let by_created = read_txn.open_table(PAGES_BY_CREATED)?;
        let pages_table = read_txn.open_table(PAGES)?;
        let mut pages = Vec::new();

        for item in by_created.iter()? {
            let (key, _) = item?;
            let (_, page_id) = key.value();
            let Some(page_guard) = pages_table.get(page_id)? else {
                continue;
            };
            let page = deserialize_page(page_guard.value())?;
            if page.page.user_id == user_id {
                pages.push(page);
            }
        }

        Ok(pages)
    }
}
