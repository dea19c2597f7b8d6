//! Snapshot export
//!
//! Reads the whole catalog and writes it as a pretty-printed snapshot
//! file. The store is never modified.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{TransferError, TransferResult};
use crate::snapshot::{export_file_name, Snapshot};
use crate::store::CatalogStore;

/// Read every collection and assemble a snapshot stamped with `exported_at`
pub async fn build_snapshot<S>(store: &S, exported_at: DateTime<Utc>) -> TransferResult<Snapshot>
where
    S: CatalogStore + ?Sized,
{
    let websites = store.all_websites().await?;
    let categories = store.all_categories().await?;
    let tags = store.all_tags().await?;
    debug!(
        "Read {} websites, {} categories, {} tags",
        websites.len(),
        categories.len(),
        tags.len()
    );

    Ok(Snapshot::new(exported_at, &websites, categories, tags))
}

/// Export the catalog to `dir/tools-export-<date>.json`
///
/// Returns the path of the written file.
pub async fn export_to_dir<S>(store: &S, dir: &Path) -> TransferResult<PathBuf>
where
    S: CatalogStore + ?Sized,
{
    let exported_at = Utc::now();
    let snapshot = build_snapshot(store, exported_at).await?;
    let text = snapshot.to_pretty_json()?;

    let path = dir.join(export_file_name(&exported_at));
    atomic_write(&path, text.as_bytes())?;

    info!(
        "Exported {} websites, {} categories, {} tags to {:?}",
        snapshot.websites.len(),
        snapshot.categories.len(),
        snapshot.tags.len(),
        path
    );
    Ok(path)
}

/// Write the catalog snapshot to any writer
pub async fn write_snapshot<S, W>(store: &S, mut writer: W) -> TransferResult<()>
where
    S: CatalogStore + ?Sized,
    W: Write,
{
    let snapshot = build_snapshot(store, Utc::now()).await?;
    let text = snapshot.to_pretty_json()?;
    writer
        .write_all(text.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| TransferError::io("<output>", e))?;
    Ok(())
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> TransferResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| TransferError::io(parent, e))?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path).map_err(|e| TransferError::io(&temp_path, e))?;
    file.write_all(data)
        .and_then(|_| file.sync_all())
        .map_err(|e| TransferError::io(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| TransferError::io(path, e))?;

    Ok(())
}
