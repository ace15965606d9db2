//! Tag categories, page tags, and per-user registered tags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Role a tag plays in a technique description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    /// 取り: the executing partner.
    Tori,
    /// 受け: the receiving partner / attack.
    Uke,
    /// 技: the technique.
    Waza,
}

impl TagCategory {
    /// All categories in display order.
    pub const ALL: [TagCategory; 3] = [Self::Tori, Self::Uke, Self::Waza];

    /// Japanese display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Tori => "取り",
            Self::Uke => "受け",
            Self::Waza => "技",
        }
    }

    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tori => "tori",
            Self::Uke => "uke",
            Self::Waza => "waza",
        }
    }
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TagCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        TagCategory::ALL
            .into_iter()
            .find(|category| {
                trimmed.eq_ignore_ascii_case(category.as_str()) || trimmed == category.label()
            })
            .ok_or_else(|| format!("unknown tag category '{}'", trimmed))
    }
}

/// A tag attached to a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTag {
    pub name: String,
    pub category: TagCategory,
}

/// A tag registered for a user, shown by tag management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub category: TagCategory,
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Create a new tag row with a fresh id.
    pub fn new(user_id: String, name: String, category: TagCategory) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name,
            category,
            created_at: Utc::now(),
        }
    }
}

/// Request payload for registering a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub category: TagCategory,
    pub user_id: String,
}

/// Response payload for tag listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagList {
    pub tags: Vec<Tag>,
}

/// Trim, drop blanks, and de-duplicate tag names case-insensitively.
///
/// The first spelling of a duplicate wins and input order is kept.
pub fn normalize_tag_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        let folded = trimmed.to_lowercase();
        if out.iter().any(|existing| existing.to_lowercase() == folded) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}

/// Parse a comma-separated tag list (`"kotegaeshi, iriminage"`).
pub fn parse_tags_csv(input: &str) -> Vec<String> {
    normalize_tag_names(input.split(','))
}

/// Combine per-category name lists into page tags, normalizing each list.
pub fn page_tags_from(tori: &[String], uke: &[String], waza: &[String]) -> Vec<PageTag> {
    [
        (TagCategory::Tori, tori),
        (TagCategory::Uke, uke),
        (TagCategory::Waza, waza),
    ]
    .into_iter()
    .flat_map(|(category, names)| {
        normalize_tag_names(names)
            .into_iter()
            .map(move |name| PageTag { name, category })
    })
    .collect()
}

/// Split page tags back into `(tori, uke, waza)` name lists.
pub fn split_page_tags(tags: &[PageTag]) -> (Vec<String>, Vec<String>, Vec<String>) {
    let names_for = |category: TagCategory| {
        tags.iter()
            .filter(|tag| tag.category == category)
            .map(|tag| tag.name.clone())
            .collect::<Vec<_>>()
    };
    (
        names_for(TagCategory::Tori),
        names_for(TagCategory::Uke),
        names_for(TagCategory::Waza),
    )
}
