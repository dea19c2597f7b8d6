//! SQLite catalog store
//!
//! Persists the three collections in a single SQLite database.
//!
//! ## Tables
//!
//! - `websites` - Website records; api keys and foreign keys as JSON arrays
//! - `categories` - Category records
//! - `tags` - Tag records with their usage counter
//!
//! Every call runs as its own statement; nothing spans calls.

use std::fs::OpenOptions;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::DateTime;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::debug;

use crate::config::Config;
use crate::models::{timestamp_now, Category, Icon, Tag, Website};
use crate::store::schema::{init_schema, needs_init};
use crate::store::{CatalogStore, StoreError, StoreResult};

const WEBSITE_COLUMNS: &str = "id, name, url, icon, icon_url, icon_mime_type, description, \
     api_keys, category_ids, tag_ids, created_at, updated_at";

/// Catalog store backed by SQLite
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database at the configured location
    pub fn open(config: &Config) -> StoreResult<Self> {
        let path = config.sqlite_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| {
                match StoreError::from_io(source, parent.to_path_buf()) {
                    StoreError::WriteError { path, source } => {
                        StoreError::CreateDirectory { path, source }
                    }
                    classified => classified,
                }
            })?;
        }

        // Fail with a classified I/O error when the file cannot be opened for writing
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::from_io(e, path.clone()))?;

        let conn = Connection::open(&path)?;
        if needs_init(&conn) {
            debug!("Initializing schema at {:?}", path);
            init_schema(&conn)?;
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn all_websites(&self) -> StoreResult<Vec<Website>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM websites ORDER BY id",
            WEBSITE_COLUMNS
        ))?;

        let rows = stmt
            .query_map([], WebsiteRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(WebsiteRow::hydrate).collect()
    }

    async fn all_categories(&self) -> StoreResult<Vec<Category>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, icon_name FROM categories ORDER BY id")?;
        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    async fn all_tags(&self) -> StoreResult<Vec<Tag>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, count FROM tags ORDER BY id")?;
        let tags = stmt
            .query_map([], tag_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        let conn = self.lock()?;
        let category = conn
            .query_row(
                "SELECT id, name, icon_name FROM categories WHERE name = ?",
                params![name],
                category_from_row,
            )
            .optional()?;
        Ok(category)
    }

    async fn find_tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        let conn = self.lock()?;
        let tag = conn
            .query_row(
                "SELECT id, name, count FROM tags WHERE name = ?",
                params![name],
                tag_from_row,
            )
            .optional()?;
        Ok(tag)
    }

    async fn add_website(&self, website: &Website) -> StoreResult<i64> {
        let icon_blob = website.icon.as_ref().and_then(Icon::as_bytes);
        let icon_url = website.icon.as_ref().and_then(Icon::as_url);
        let api_keys = serde_json::to_string(&website.api_keys)?;
        let category_ids = serde_json::to_string(&website.category_ids)?;
        let tag_ids = serde_json::to_string(&website.tag_ids)?;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT INTO websites (name, url, icon, icon_url, icon_mime_type, description,
                                  api_keys, category_ids, tag_ids, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                website.name,
                website.url,
                icon_blob,
                icon_url,
                website.icon_mime_type,
                website.description,
                api_keys,
                category_ids,
                tag_ids,
                website.created_at.timestamp_millis(),
                website.updated_at.timestamp_millis(),
            ],
        )
        .map_err(|e| classify_insert_error(e, "websites", &website.url))?;

        Ok(conn.last_insert_rowid())
    }

    async fn add_category(&self, category: &Category) -> StoreResult<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO categories (name, icon_name) VALUES (?, ?)",
            params![category.name, category.icon_name],
        )
        .map_err(|e| classify_insert_error(e, "categories", &category.name))?;
        Ok(conn.last_insert_rowid())
    }

    async fn add_tag(&self, tag: &Tag) -> StoreResult<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO tags (name, count) VALUES (?, ?)",
            params![tag.name, tag.count],
        )
        .map_err(|e| classify_insert_error(e, "tags", &tag.name))?;
        Ok(conn.last_insert_rowid())
    }

    async fn clear_websites(&self) -> StoreResult<()> {
        self.lock()?.execute("DELETE FROM websites", [])?;
        Ok(())
    }

    async fn clear_categories(&self) -> StoreResult<()> {
        self.lock()?.execute("DELETE FROM categories", [])?;
        Ok(())
    }

    async fn clear_tags(&self) -> StoreResult<()> {
        self.lock()?.execute("DELETE FROM tags", [])?;
        Ok(())
    }

    async fn counts(&self) -> StoreResult<(usize, usize, usize)> {
        let conn = self.lock()?;
        let count = |table: &str| -> StoreResult<usize> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok(n as usize)
        };
        Ok((count("websites")?, count("categories")?, count("tags")?))
    }
}

// ==================== Internal structs ====================

struct WebsiteRow {
    id: i64,
    name: String,
    url: String,
    icon: Option<Vec<u8>>,
    icon_url: Option<String>,
    icon_mime_type: String,
    description: Option<String>,
    api_keys: String,
    category_ids: String,
    tag_ids: String,
    created_at: i64,
    updated_at: i64,
}

impl WebsiteRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            url: row.get(2)?,
            icon: row.get(3)?,
            icon_url: row.get(4)?,
            icon_mime_type: row.get(5)?,
            description: row.get(6)?,
            api_keys: row.get(7)?,
            category_ids: row.get(8)?,
            tag_ids: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    fn hydrate(self) -> StoreResult<Website> {
        let id = self.id;
        let corrupt = |column: &str, e: serde_json::Error| StoreError::CorruptRow {
            collection: "websites",
            id,
            details: format!("invalid {}: {}", column, e),
        };

        let icon = match (self.icon, self.icon_url) {
            (Some(bytes), _) => Some(Icon::Inline(bytes)),
            (None, Some(url)) => Some(Icon::Remote(url)),
            (None, None) => None,
        };

        Ok(Website {
            id: Some(id),
            name: self.name,
            url: self.url,
            icon,
            icon_mime_type: self.icon_mime_type,
            description: self.description,
            api_keys: serde_json::from_str(&self.api_keys).map_err(|e| corrupt("api_keys", e))?,
            category_ids: serde_json::from_str(&self.category_ids)
                .map_err(|e| corrupt("category_ids", e))?,
            tag_ids: serde_json::from_str(&self.tag_ids).map_err(|e| corrupt("tag_ids", e))?,
            created_at: DateTime::from_timestamp_millis(self.created_at).unwrap_or_else(timestamp_now),
            updated_at: DateTime::from_timestamp_millis(self.updated_at).unwrap_or_else(timestamp_now),
        })
    }
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        icon_name: row.get(2)?,
    })
}

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        count: row.get(2)?,
    })
}

/// Turn a UNIQUE violation into `StoreError::Duplicate`
fn classify_insert_error(error: rusqlite::Error, collection: &'static str, key: &str) -> StoreError {
    match &error {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::Duplicate {
                collection,
                key: key.to_string(),
            }
        }
        _ => StoreError::Database(error),
    }
}
