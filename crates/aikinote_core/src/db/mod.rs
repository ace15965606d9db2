//! Embedded storage for the reference backend.

/// Page storage helpers.
pub mod page;
/// redb table definitions.
pub mod tables;
/// Tag storage helpers.
pub mod tag;

use crate::error::AppError;
use std::path::Path;
use std::sync::Arc;

/// Database handle with accessors for pages and tags.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub pages: page::PageDb,
    pub tags: tag::TagDb,
}

impl Database {
    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Errors
    /// Returns an error if the required tables cannot be created.
    fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            pages: page::PageDb::new(db.clone())?,
            tags: tag::TagDb::new(db.clone())?,
            db,
        })
    }

    /// Open (or create) the database inside directory `path`.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, the file is held
    /// by another process, or tables cannot be initialized.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                dir.display(),
                err
            ))
        })?;

        let file = dir.join(tables::REDB_FILE_NAME);
        let db = redb::Database::create(&file).map_err(|err| match err {
            redb::DatabaseError::DatabaseAlreadyOpen => AppError::StorageMessage(format!(
                "Database '{}' is already open in another process.\n\
                 Stop the other AikiNote server or set DB_PATH to a different location.",
                file.display()
            )),
            other => other.into(),
        })?;
        tracing::debug!(path = %file.display(), "opened database");

        Self::from_shared(Arc::new(db))
    }
}

#[cfg(test)]
mod tests;
