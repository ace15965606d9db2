//! Data models for API requests, responses, and persistence.

/// Discriminated success/failure envelope used on the wire.
pub mod envelope;
/// Training page models (server rows, requests, client records).
pub mod page;
/// Tag categories, page tags, and registered tags.
pub mod tag;

pub use envelope::ApiResponse;
pub use page::{
    CreatePageRequest, DateZone, ListPagesQuery, TrainingPage, TrainingPageRecord,
    TrainingPageWithTags, TrainingPagesList, UpdatePageRequest,
};
pub use tag::{CreateTagRequest, PageTag, Tag, TagCategory, TagList};
