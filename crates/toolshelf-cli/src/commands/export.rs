//! Export command handler

use std::path::PathBuf;

use anyhow::{Context, Result};

use toolshelf_core::export::{export_to_dir, write_snapshot};
use toolshelf_core::{Config, SqliteStore};

use crate::output::Output;

/// Export the catalog to a file, or to stdout with `--stdout`
pub async fn run(
    store: &SqliteStore,
    config: &Config,
    dir: Option<PathBuf>,
    stdout: bool,
    output: &Output,
) -> Result<()> {
    if stdout {
        let handle = std::io::stdout().lock();
        write_snapshot(store, handle)
            .await
            .context("Failed to write snapshot")?;
        println!();
        return Ok(());
    }

    let dir = dir.unwrap_or_else(|| config.export_dir());

    let path = export_to_dir(store, &dir)
        .await
        .context("Export failed")?;
    output.print_export(&path);

    Ok(())
}
