//! Snapshot import
//!
//! Merges a snapshot into the local store in three ordered phases:
//!
//! 1. Categories, matched by name
//! 2. Tags, matched by name
//! 3. Websites, skipped when their URL is already present
//!
//! The first two phases each produce an `IdMap` from snapshot ids to local
//! ids; the website phase uses both to rewrite `categoryIds` and `tagIds`.
//! References that cannot be resolved become `UNRESOLVED_ID`.
//!
//! Every store call commits on its own. A failing call aborts the import
//! and leaves earlier writes in place.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::codec;
use crate::error::{TransferError, TransferResult};
use crate::models::{
    timestamp_now, Category, Tag, Website, DEFAULT_ICON_MIME_TYPE, UNRESOLVED_ID,
};
use crate::snapshot::{parse_timestamp, Snapshot, SnapshotWebsite};
use crate::store::CatalogStore;

/// How an import treats the records already in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Keep existing records and only add what is missing
    #[default]
    Merge,
    /// Clear all three collections first
    Replace,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Merge => "merge",
            ImportMode::Replace => "replace",
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => Ok(ImportMode::Merge),
            "replace" => Ok(ImportMode::Replace),
            other => Err(format!(
                "Unknown import mode '{}'. Use 'merge' or 'replace'.",
                other
            )),
        }
    }
}

/// Counts reported after an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Websites created
    pub websites: usize,
    /// Categories processed (matched or created)
    pub categories: usize,
    /// Tags processed (matched or created)
    pub tags: usize,
    /// Websites dropped because their URL was already present
    pub skipped_websites: usize,
    /// Category/tag references rewritten to `UNRESOLVED_ID`
    pub unresolved_references: usize,
}

/// Mapping from snapshot ids to local ids for one collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    ids: HashMap<i64, i64>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that snapshot id `foreign` is local id `local`
    pub fn insert(&mut self, foreign: i64, local: i64) {
        self.ids.insert(foreign, local);
    }

    /// Local id for a snapshot id, if one was recorded
    pub fn get(&self, foreign: i64) -> Option<i64> {
        self.ids.get(&foreign).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Rewrite a list of snapshot ids, using `UNRESOLVED_ID` for unknown ones
    ///
    /// Returns the rewritten list and how many entries were unresolved.
    pub fn remap(&self, foreign_ids: &[i64]) -> (Vec<i64>, usize) {
        let mut unresolved = 0;
        let local = foreign_ids
            .iter()
            .map(|id| match self.get(*id) {
                Some(local) => local,
                None => {
                    unresolved += 1;
                    UNRESOLVED_ID
                }
            })
            .collect();
        (local, unresolved)
    }
}

/// Result of a category or tag phase
#[derive(Debug, Clone, Default)]
pub struct PhaseOutcome {
    /// Snapshot id to local id
    pub id_map: IdMap,
    /// Local id of every processed record, in snapshot order
    pub local_ids: Vec<i64>,
}

/// Result of the website phase
#[derive(Debug, Clone, Copy, Default)]
pub struct WebsitePhaseOutcome {
    pub created: usize,
    pub skipped: usize,
    pub unresolved_references: usize,
}

/// Import a snapshot file
pub async fn import_file<S>(store: &S, path: &Path, mode: ImportMode) -> TransferResult<ImportSummary>
where
    S: CatalogStore + ?Sized,
{
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| TransferError::io(path, e))?;
    import(store, &bytes, mode).await
}

/// Import snapshot JSON bytes into the store
///
/// The document is parsed and validated before anything is written.
pub async fn import<S>(store: &S, bytes: &[u8], mode: ImportMode) -> TransferResult<ImportSummary>
where
    S: CatalogStore + ?Sized,
{
    let snapshot = Snapshot::from_slice(bytes)?;
    import_snapshot(store, &snapshot, mode).await
}

/// Merge an already parsed snapshot into the store
pub async fn import_snapshot<S>(
    store: &S,
    snapshot: &Snapshot,
    mode: ImportMode,
) -> TransferResult<ImportSummary>
where
    S: CatalogStore + ?Sized,
{
    info!(
        "Importing snapshot exported at {} ({} websites, {} categories, {} tags) in {} mode",
        snapshot.exported_at,
        snapshot.websites.len(),
        snapshot.categories.len(),
        snapshot.tags.len(),
        mode
    );

    if mode == ImportMode::Replace {
        store.clear_websites().await?;
        store.clear_categories().await?;
        store.clear_tags().await?;
        debug!("Cleared all collections");
    }

    let categories = import_categories(store, &snapshot.categories).await?;
    let tags = import_tags(store, &snapshot.tags).await?;
    let websites =
        import_websites(store, &snapshot.websites, &categories.id_map, &tags.id_map).await?;

    let summary = ImportSummary {
        websites: websites.created,
        categories: categories.local_ids.len(),
        tags: tags.local_ids.len(),
        skipped_websites: websites.skipped,
        unresolved_references: websites.unresolved_references,
    };

    info!(
        "Import complete: {} websites created ({} skipped), {} categories, {} tags, {} unresolved references",
        summary.websites,
        summary.skipped_websites,
        summary.categories,
        summary.tags,
        summary.unresolved_references
    );
    Ok(summary)
}

/// Match each snapshot category by name, creating the missing ones
pub async fn import_categories<S>(store: &S, categories: &[Category]) -> TransferResult<PhaseOutcome>
where
    S: CatalogStore + ?Sized,
{
    let mut outcome = PhaseOutcome::default();

    for category in categories {
        let local_id = match store.find_category_by_name(&category.name).await? {
            Some(Category { id: Some(id), .. }) => {
                debug!("Matched category '{}' to {}", category.name, id);
                id
            }
            _ => {
                let id = store
                    .add_category(&Category::new(&category.name, &category.icon_name))
                    .await?;
                debug!("Created category '{}' as {}", category.name, id);
                id
            }
        };

        if let Some(foreign) = category.id {
            outcome.id_map.insert(foreign, local_id);
        }
        outcome.local_ids.push(local_id);
    }

    Ok(outcome)
}

/// Match each snapshot tag by name, creating the missing ones with a zero count
pub async fn import_tags<S>(store: &S, tags: &[Tag]) -> TransferResult<PhaseOutcome>
where
    S: CatalogStore + ?Sized,
{
    let mut outcome = PhaseOutcome::default();

    for tag in tags {
        let local_id = match store.find_tag_by_name(&tag.name).await? {
            Some(Tag { id: Some(id), .. }) => {
                debug!("Matched tag '{}' to {}", tag.name, id);
                id
            }
            _ => {
                let id = store.add_tag(&Tag::new(&tag.name)).await?;
                debug!("Created tag '{}' as {}", tag.name, id);
                id
            }
        };

        if let Some(foreign) = tag.id {
            outcome.id_map.insert(foreign, local_id);
        }
        outcome.local_ids.push(local_id);
    }

    Ok(outcome)
}

/// Create every snapshot website whose URL is not in the store yet
pub async fn import_websites<S>(
    store: &S,
    websites: &[SnapshotWebsite],
    category_map: &IdMap,
    tag_map: &IdMap,
) -> TransferResult<WebsitePhaseOutcome>
where
    S: CatalogStore + ?Sized,
{
    let mut known_urls: HashSet<String> = store
        .all_websites()
        .await?
        .into_iter()
        .map(|w| w.url)
        .collect();

    let mut outcome = WebsitePhaseOutcome::default();
    let now = timestamp_now();

    for incoming in websites {
        if known_urls.contains(&incoming.url) {
            debug!("Skipping website {}: URL already present", incoming.url);
            outcome.skipped += 1;
            continue;
        }

        let (website, unresolved) = localize_website(incoming, category_map, tag_map, now);
        if unresolved > 0 {
            debug!(
                "Website {} has {} unresolved category/tag references",
                incoming.url, unresolved
            );
        }

        store.add_website(&website).await?;
        known_urls.insert(website.url);
        outcome.created += 1;
        outcome.unresolved_references += unresolved;
    }

    Ok(outcome)
}

/// Build the local form of a snapshot website
///
/// Returns the website and the number of references rewritten to `UNRESOLVED_ID`.
fn localize_website(
    incoming: &SnapshotWebsite,
    category_map: &IdMap,
    tag_map: &IdMap,
    now: DateTime<Utc>,
) -> (Website, usize) {
    let (category_ids, unresolved_categories) =
        category_map.remap(incoming.category_ids.as_deref().unwrap_or_default());
    let (tag_ids, unresolved_tags) = tag_map.remap(incoming.tag_ids.as_deref().unwrap_or_default());

    let website = Website {
        id: None,
        name: incoming.name.clone(),
        url: incoming.url.clone(),
        icon: incoming.icon.as_ref().and_then(codec::decode_value),
        icon_mime_type: incoming
            .icon_mime_type
            .clone()
            .filter(|mime| !mime.is_empty())
            .unwrap_or_else(|| DEFAULT_ICON_MIME_TYPE.to_string()),
        description: incoming.description.clone(),
        api_keys: incoming.api_keys.clone().unwrap_or_default(),
        category_ids,
        tag_ids,
        created_at: timestamp_or(incoming.created_at.as_deref(), "createdAt", &incoming.url, now),
        updated_at: timestamp_or(incoming.updated_at.as_deref(), "updatedAt", &incoming.url, now),
    };

    (website, unresolved_categories + unresolved_tags)
}

fn timestamp_or(value: Option<&str>, field: &str, url: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    match value {
        None => now,
        Some(text) => parse_timestamp(text).unwrap_or_else(|| {
            warn!("Invalid {} '{}' on {}; using current time", field, text, url);
            now
        }),
    }
}
