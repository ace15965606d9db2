//! Shared constants used across AikiNote crates.

/// Default API port for the AikiNote backend.
pub const DEFAULT_PORT: u16 = 38421;

/// Default maximum request body accepted by the API layer.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Number of records exposed per "load more" step in the page list.
pub const LIST_PAGE_SIZE: usize = 25;

/// Batch size used by the fetch-all loop.
pub const FETCH_BATCH_SIZE: usize = 100;

/// Default `limit` for list requests that omit one.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Upper bound the backend applies to any list `limit`.
pub const MAX_LIST_LIMIT: usize = 100;

/// Delay applied to search text before it reaches the filter engine.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Maximum title length accepted by the backend, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Default base URL for CLI/API clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://localhost:38421";
