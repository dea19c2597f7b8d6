//! Import command handler

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};

use toolshelf_core::import::import_file;
use toolshelf_core::{CatalogStore, ImportMode, SqliteStore};

use crate::output::Output;

/// Import a snapshot file into the catalog
pub async fn run(
    store: &SqliteStore,
    file: &Path,
    mode: ImportMode,
    yes: bool,
    output: &Output,
) -> Result<()> {
    if mode == ImportMode::Replace && !yes && output.should_prompt() {
        let (websites, categories, tags) = store.counts().await?;
        let prompt = format!(
            "Replace will delete {} websites, {} categories and {} tags before importing. Continue?",
            websites, categories, tags
        );
        if !confirm(&prompt)? {
            output.message("Import cancelled.");
            return Ok(());
        }
    }

    let summary = import_file(store, file, mode)
        .await
        .with_context(|| format!("Failed to import {:?}", file))?;
    output.print_import_summary(&summary);

    Ok(())
}

/// Ask a yes/no question on stdin
fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(is_yes(&input))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
