//! In-memory catalog store
//!
//! Keeps the three collections in vectors behind a mutex. Ids are
//! auto-incremented per collection starting at 1 and are never reused,
//! even after a clear.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::models::{Category, Tag, Website};
use crate::store::{CatalogStore, StoreError, StoreResult};

#[derive(Default)]
struct Collections {
    websites: Vec<Website>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    last_website_id: i64,
    last_category_id: i64,
    last_tag_id: i64,
}

/// Catalog store held entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Collections>> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn all_websites(&self) -> StoreResult<Vec<Website>> {
        Ok(self.lock()?.websites.clone())
    }

    async fn all_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.lock()?.categories.clone())
    }

    async fn all_tags(&self) -> StoreResult<Vec<Tag>> {
        Ok(self.lock()?.tags.clone())
    }

    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        Ok(self
            .lock()?
            .categories
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn find_tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        Ok(self.lock()?.tags.iter().find(|t| t.name == name).cloned())
    }

    async fn add_website(&self, website: &Website) -> StoreResult<i64> {
        let mut inner = self.lock()?;
        if inner.websites.iter().any(|w| w.url == website.url) {
            return Err(StoreError::Duplicate {
                collection: "websites",
                key: website.url.clone(),
            });
        }

        inner.last_website_id += 1;
        let id = inner.last_website_id;
        let mut stored = website.clone();
        stored.id = Some(id);
        inner.websites.push(stored);
        Ok(id)
    }

    async fn add_category(&self, category: &Category) -> StoreResult<i64> {
        let mut inner = self.lock()?;
        if inner.categories.iter().any(|c| c.name == category.name) {
            return Err(StoreError::Duplicate {
                collection: "categories",
                key: category.name.clone(),
            });
        }

        inner.last_category_id += 1;
        let id = inner.last_category_id;
        let mut stored = category.clone();
        stored.id = Some(id);
        inner.categories.push(stored);
        Ok(id)
    }

    async fn add_tag(&self, tag: &Tag) -> StoreResult<i64> {
        let mut inner = self.lock()?;
        if inner.tags.iter().any(|t| t.name == tag.name) {
            return Err(StoreError::Duplicate {
                collection: "tags",
                key: tag.name.clone(),
            });
        }

        inner.last_tag_id += 1;
        let id = inner.last_tag_id;
        let mut stored = tag.clone();
        stored.id = Some(id);
        inner.tags.push(stored);
        Ok(id)
    }

    async fn clear_websites(&self) -> StoreResult<()> {
        self.lock()?.websites.clear();
        Ok(())
    }

    async fn clear_categories(&self) -> StoreResult<()> {
        self.lock()?.categories.clear();
        Ok(())
    }

    async fn clear_tags(&self) -> StoreResult<()> {
        self.lock()?.tags.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_assigns_sequential_ids() {
        let store = MemoryStore::new();

        let first = store.add_category(&Category::new("Dev", "code")).await.unwrap();
        let second = store.add_category(&Category::new("Design", "brush")).await.unwrap();
        assert_eq!((first, second), (1, 2));

        let categories = store.all_categories().await.unwrap();
        assert_eq!(categories[0].id, Some(1));
        assert_eq!(categories[1].name, "Design");
    }

    #[tokio::test]
    async fn test_add_ignores_incoming_id() {
        let store = MemoryStore::new();
        let mut tag = Tag::new("rust");
        tag.id = Some(99);

        let id = store.add_tag(&tag).await.unwrap();
        assert_eq!(id, 1);
        assert_eq!(store.all_tags().await.unwrap()[0].id, Some(1));
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let store = MemoryStore::new();
        store.add_tag(&Tag::new("rust")).await.unwrap();
        store.add_category(&Category::new("Dev", "code")).await.unwrap();

        let tag = store.find_tag_by_name("rust").await.unwrap().unwrap();
        assert_eq!(tag.id, Some(1));
        assert!(store.find_tag_by_name("Rust").await.unwrap().is_none());

        let category = store.find_category_by_name("Dev").await.unwrap().unwrap();
        assert_eq!(category.icon_name, "code");
        assert!(store.find_category_by_name("dev").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_natural_keys_are_unique() {
        let store = MemoryStore::new();
        store
            .add_website(&Website::new("One", "https://example.com"))
            .await
            .unwrap();

        let err = store
            .add_website(&Website::new("Two", "https://example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { collection: "websites", .. }));

        store.add_tag(&Tag::new("rust")).await.unwrap();
        assert!(store.add_tag(&Tag::new("rust")).await.is_err());
    }

    #[tokio::test]
    async fn test_clear_does_not_reuse_ids() {
        let store = MemoryStore::new();
        store
            .add_website(&Website::new("One", "https://one.com"))
            .await
            .unwrap();
        store.clear_websites().await.unwrap();
        assert!(store.all_websites().await.unwrap().is_empty());

        let id = store
            .add_website(&Website::new("One", "https://one.com"))
            .await
            .unwrap();
        assert_eq!(id, 2);
    }

    #[tokio::test]
    async fn test_counts() {
        let store = MemoryStore::new();
        store
            .add_website(&Website::new("One", "https://one.com"))
            .await
            .unwrap();
        store.add_tag(&Tag::new("a")).await.unwrap();
        store.add_tag(&Tag::new("b")).await.unwrap();

        assert_eq!(store.counts().await.unwrap(), (1, 0, 2));
    }
}
