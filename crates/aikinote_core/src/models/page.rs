//! Training page models: stored rows, wire payloads, and client records.

use super::tag::{page_tags_from, PageTag};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Page row stored by the backend and returned inside [`TrainingPageWithTags`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPage {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainingPage {
    /// Create a new page with a fresh id and `created_at == updated_at == now`.
    pub fn new(user_id: String, title: String, content: String, comment: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            title,
            content,
            comment,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Canonical page record on the wire: the page plus its tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPageWithTags {
    pub page: TrainingPage,
    #[serde(default)]
    pub tags: Vec<PageTag>,
}

/// Payload of a page listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPagesList {
    pub training_pages: Vec<TrainingPageWithTags>,
}

/// Request payload for creating a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePageRequest {
    pub title: String,
    #[serde(default)]
    pub tori: Vec<String>,
    #[serde(default)]
    pub uke: Vec<String>,
    #[serde(default)]
    pub waza: Vec<String>,
    pub content: String,
    #[serde(default)]
    pub comment: String,
    pub user_id: String,
}

impl CreatePageRequest {
    /// Tags carried by this request, normalized per category.
    pub fn page_tags(&self) -> Vec<PageTag> {
        page_tags_from(&self.tori, &self.uke, &self.waza)
    }
}

/// Request payload for replacing a page's editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePageRequest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tori: Vec<String>,
    #[serde(default)]
    pub uke: Vec<String>,
    #[serde(default)]
    pub waza: Vec<String>,
    pub content: String,
    #[serde(default)]
    pub comment: String,
    pub user_id: String,
}

impl UpdatePageRequest {
    /// Tags carried by this request, normalized per category.
    pub fn page_tags(&self) -> Vec<PageTag> {
        page_tags_from(&self.tori, &self.uke, &self.waza)
    }

    /// Start an update that keeps every field of `current`.
    pub fn from_current(current: &TrainingPageWithTags) -> Self {
        let (tori, uke, waza) = super::tag::split_page_tags(&current.tags);
        Self {
            id: current.page.id.clone(),
            title: current.page.title.clone(),
            tori,
            uke,
            waza,
            content: current.page.content.clone(),
            comment: current.page.comment.clone(),
            user_id: current.page.user_id.clone(),
        }
    }
}

/// Query parameters for listing pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPagesQuery {
    pub user_id: String,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub query: Option<String>,
    /// Comma-separated tag names; a page must carry all of them.
    pub tags: Option<String>,
    pub date: Option<NaiveDate>,
    /// Offset from UTC used to derive the page date for `date` filtering.
    pub utc_offset_minutes: Option<i32>,
}

/// Time zone used to turn server timestamps into calendar dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateZone {
    /// The process's local time zone.
    #[default]
    Local,
    /// A fixed offset from UTC.
    Fixed(FixedOffset),
}

impl DateZone {
    /// UTC itself.
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Fixed offset of `minutes` east of UTC, if in range.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::Fixed)
    }

    /// Calendar date of `timestamp` in this zone.
    pub fn date_of(&self, timestamp: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Local => timestamp.with_timezone(&Local).date_naive(),
            Self::Fixed(offset) => timestamp.with_timezone(offset).date_naive(),
        }
    }
}

/// Page as held by the client list: display fields, local date, tag names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPageRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub comment: String,
    pub date: NaiveDate,
    pub tags: Vec<String>,
}

impl TrainingPageRecord {
    /// Reduce a canonical wire record to a list record.
    ///
    /// `created_at` becomes a calendar date in `zone`; tags lose their category.
    pub fn from_remote(item: &TrainingPageWithTags, zone: DateZone) -> Self {
        Self {
            id: item.page.id.clone(),
            title: item.page.title.clone(),
            content: item.page.content.clone(),
            comment: item.page.comment.clone(),
            date: zone.date_of(item.page.created_at),
            tags: item.tags.iter().map(|tag| tag.name.clone()).collect(),
        }
    }
}
