//! Status command handler

use anyhow::Result;

use toolshelf_core::{CatalogStore, Config, SqliteStore};

use crate::output::{Output, OutputFormat};

/// Show catalog counts and where the catalog lives
pub async fn show(store: &SqliteStore, config: &Config, output: &Output) -> Result<()> {
    let (websites, categories, tags) = store.counts().await?;
    let database = config.sqlite_path();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "database": database,
                    "export_dir": config.export_dir(),
                    "default_import_mode": config.default_import_mode,
                    "counts": {
                        "websites": websites,
                        "categories": categories,
                        "tags": tags
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{} {} {}", websites, categories, tags);
        }
        OutputFormat::Human => {
            println!("toolshelf Status");
            println!("================");
            println!();
            println!("Storage:");
            println!("  Database:   {}", database.display());
            println!("  Export dir: {}", config.export_dir().display());
            println!("  Import:     {}", config.default_import_mode);
            println!();
            println!("Contents:");
            println!("  Websites:   {}", websites);
            println!("  Categories: {}", categories);
            println!("  Tags:       {}", tags);
        }
    }

    Ok(())
}
