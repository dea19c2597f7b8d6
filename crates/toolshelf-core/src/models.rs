//! Data models for toolshelf
//!
//! Defines the catalog records: Website, Category, and Tag.
//! Ids are assigned by the store; a record that has not been stored yet
//! carries `id: None`.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Mime type assumed for icons that arrive without one
pub const DEFAULT_ICON_MIME_TYPE: &str = "image/png";

/// Placeholder foreign key for a category or tag reference that could not be resolved
pub const UNRESOLVED_ID: i64 = 0;

/// Current time, truncated to the millisecond precision snapshots and SQLite keep
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A website icon, either embedded image bytes or a reference to a remote image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Icon {
    /// Raw image bytes
    Inline(Vec<u8>),
    /// An http(s) URL pointing at the image
    Remote(String),
}

impl Icon {
    /// Get the inline bytes, if this is an embedded icon
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Icon::Inline(bytes) => Some(bytes),
            Icon::Remote(_) => None,
        }
    }

    /// Get the remote URL, if this icon is a reference
    pub fn as_url(&self) -> Option<&str> {
        match self {
            Icon::Inline(_) => None,
            Icon::Remote(url) => Some(url),
        }
    }
}

/// A cataloged website or tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    /// Store-assigned identifier
    pub id: Option<i64>,
    /// Display name
    pub name: String,
    /// The URL (unique within a store)
    pub url: String,
    /// Optional icon
    pub icon: Option<Icon>,
    /// Mime type of the icon
    pub icon_mime_type: String,
    /// Optional description
    pub description: Option<String>,
    /// API keys associated with this site, in the order they were added
    pub api_keys: Vec<String>,
    /// Categories this website belongs to
    pub category_ids: Vec<i64>,
    /// Tags attached to this website
    pub tag_ids: Vec<i64>,
    /// When this website was created
    pub created_at: DateTime<Utc>,
    /// When this website was last updated
    pub updated_at: DateTime<Utc>,
}

impl Website {
    /// Create a new website with the given name and URL
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            id: None,
            name: name.into(),
            url: url.into(),
            icon: None,
            icon_mime_type: DEFAULT_ICON_MIME_TYPE.to_string(),
            description: None,
            api_keys: Vec::new(),
            category_ids: Vec::new(),
            tag_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the description
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.updated_at = timestamp_now();
    }

    /// Set the icon and its mime type
    pub fn set_icon(&mut self, icon: Option<Icon>, mime_type: impl Into<String>) {
        self.icon = icon;
        self.icon_mime_type = mime_type.into();
        self.updated_at = timestamp_now();
    }

    /// Append an API key
    pub fn add_api_key(&mut self, key: impl Into<String>) {
        self.api_keys.push(key.into());
        self.updated_at = timestamp_now();
    }

    /// Add a category reference
    pub fn add_category(&mut self, category_id: i64) {
        if !self.category_ids.contains(&category_id) {
            self.category_ids.push(category_id);
            self.updated_at = timestamp_now();
        }
    }

    /// Add a tag reference
    pub fn add_tag(&mut self, tag_id: i64) {
        if !self.tag_ids.contains(&tag_id) {
            self.tag_ids.push(tag_id);
            self.updated_at = timestamp_now();
        }
    }
}

/// A category grouping websites
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Store-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Category name (unique within a store)
    pub name: String,
    /// Name of the icon shown next to the category
    #[serde(default)]
    pub icon_name: String,
}

impl Category {
    /// Create a new category
    pub fn new(name: impl Into<String>, icon_name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            icon_name: icon_name.into(),
        }
    }
}

/// A tag for labelling websites
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    /// Store-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Tag name (unique within a store)
    pub name: String,
    /// Usage counter
    #[serde(default)]
    pub count: i64,
}

impl Tag {
    /// Create a new, unused tag
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            count: 0,
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
