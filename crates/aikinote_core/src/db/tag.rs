//! Tag storage operations backed by redb.

use crate::{db::tables::TAGS, error::AppError, models::tag::*};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

pub(crate) fn deserialize_tag(bytes: &[u8]) -> Result<Tag, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

fn same_tag(tag: &Tag, name: &str, category: TagCategory) -> bool {
    tag.category == category && tag.name.to_lowercase() == name.to_lowercase()
}

/// Register `page_tags` for `user_id` inside an open write transaction.
///
/// Tags already registered (same category, case-insensitive name) are left
/// alone. The caller commits.
pub(crate) fn register_tags(
    txn: &redb::WriteTransaction,
    user_id: &str,
    page_tags: &[PageTag],
) -> Result<usize, AppError> {
    if page_tags.is_empty() {
        return Ok(0);
    }
    let mut table = txn.open_table(TAGS)?;
    let mut existing = Vec::new();
    for item in table.range((user_id, "")..)? {
        let (key, value) = item?;
        if key.value().0 != user_id {
            break;
        }
        existing.push(deserialize_tag(value.value())?);
    }

    let mut added = 0;
    for page_tag in page_tags {
        if existing
            .iter()
            .any(|tag| same_tag(tag, &page_tag.name, page_tag.category))
        {
            continue;
        }
        let tag = Tag::new(user_id.to_string(), page_tag.name.clone(), page_tag.category);
        let encoded = bincode::serialize(&tag)?;
        table.insert((user_id, tag.id.as_str()), encoded.as_slice())?;
        existing.push(tag);
        added += 1;
    }
    Ok(added)
}

/// Accessor for the tag table.
pub struct TagDb {
    db: Arc<redb::Database>,
}

impl TagDb {
    /// Initialize the tag table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(TAGS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Tags registered by `user_id`, ordered by category then name.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Tag>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TAGS)?;
        let mut tags = Vec::new();
        for item in table.range((user_id, "")..)? {
            let (key, value) = item?;
            if key.value().0 != user_id {
                break;
            }
            tags.push(deserialize_tag(value.value())?);
        }
        tags.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(tags)
    }

    /// Register a tag, returning the existing row when one already matches.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for a blank name, or storage errors.
    pub fn create(
        &self,
        user_id: &str,
        name: &str,
        category: TagCategory,
    ) -> Result<Tag, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Tag name is required".to_string()));
        }

        let write_txn = self.db.begin_write()?;
        let tag = {
            let mut table = write_txn.open_table(TAGS)?;
            let mut found = None;
            for item in table.range((user_id, "")..)? {
                let (key, value) = item?;
                if key.value().0 != user_id {
                    break;
                }
                let tag = deserialize_tag(value.value())?;
                if same_tag(&tag, name, category) {
                    found = Some(tag);
                    break;
                }
            }
            match found {
                Some(tag) => tag,
                None => {
                    let tag = Tag::new(user_id.to_string(), name.to_string(), category);
                    let encoded = bincode::serialize(&tag)?;
                    table.insert((user_id, tag.id.as_str()), encoded.as_slice())?;
                    tag
                }
            }
        };
        write_txn.commit()?;
        Ok(tag)
    }

    /// Delete tag `id` owned by `user_id`.
    ///
    /// Pages keep their copy of the tag name.
    ///
    /// # Returns
    /// `true` when a row was deleted.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn delete(&self, user_id: &str, id: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(TAGS)?;
            let removed = table.remove((user_id, id))?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }
}
