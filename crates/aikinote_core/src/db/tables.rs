//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Canonical page rows (`TrainingPageWithTags`, bincode-encoded).
pub const PAGES: TableDefinition<&str, &[u8]> = TableDefinition::new("pages");

/// Listing index ordered by reverse creation millis then id.
pub const PAGES_BY_CREATED: TableDefinition<(u64, &str), ()> =
    TableDefinition::new("pages_by_created");

/// Registered tags keyed by `(user_id, tag id)` (`Tag`, bincode-encoded).
pub const TAGS: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("tags");
