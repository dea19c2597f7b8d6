//! Catalog storage
//!
//! The import and export code only talks to the `CatalogStore` trait.
//! Two backends implement it:
//!
//! - **MemoryStore**: in-process collections, used by tests and embedders
//! - **SqliteStore**: persistent collections in a local SQLite database
//!
//! Each collection supports enumerate-all, find-by-natural-key,
//! add (returning the new id), and clear. There is no cross-call
//! transaction: every call commits on its own.

pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;

use crate::models::{Category, Tag, Website};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
pub use sqlite::SqliteStore;

/// Storage backend for the three catalog collections
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All websites, in insertion order
    async fn all_websites(&self) -> StoreResult<Vec<Website>>;

    /// All categories, in insertion order
    async fn all_categories(&self) -> StoreResult<Vec<Category>>;

    /// All tags, in insertion order
    async fn all_tags(&self) -> StoreResult<Vec<Tag>>;

    /// Find the category with exactly this name
    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>>;

    /// Find the tag with exactly this name
    async fn find_tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>>;

    /// Insert a website, ignoring `website.id`, and return the assigned id
    async fn add_website(&self, website: &Website) -> StoreResult<i64>;

    /// Insert a category, ignoring `category.id`, and return the assigned id
    async fn add_category(&self, category: &Category) -> StoreResult<i64>;

    /// Insert a tag, ignoring `tag.id`, and return the assigned id
    async fn add_tag(&self, tag: &Tag) -> StoreResult<i64>;

    /// Remove every website
    async fn clear_websites(&self) -> StoreResult<()>;

    /// Remove every category
    async fn clear_categories(&self) -> StoreResult<()>;

    /// Remove every tag
    async fn clear_tags(&self) -> StoreResult<()>;

    /// Record counts as (websites, categories, tags)
    async fn counts(&self) -> StoreResult<(usize, usize, usize)> {
        Ok((
            self.all_websites().await?.len(),
            self.all_categories().await?.len(),
            self.all_tags().await?.len(),
        ))
    }
}
