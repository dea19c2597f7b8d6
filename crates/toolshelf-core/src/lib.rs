//! toolshelf Core Library
//!
//! This crate provides the core functionality for toolshelf, a personal
//! catalog of websites and tools organized by category and tag.
//!
//! # Architecture
//!
//! - **Store**: the `CatalogStore` trait over three collections
//!   (websites, categories, tags), with SQLite and in-memory backends
//! - **Snapshot**: a versioned JSON document holding the whole catalog
//!
//! Export writes a snapshot; import merges one back, de-duplicating by
//! natural key (website URL, category name, tag name) and remapping the
//! snapshot's ids onto local ids.
//!
//! # Quick Start
//!
//! ```text
//! let store = SqliteStore::open(&Config::load()?)?;
//!
//! // Write tools-export-<date>.json
//! let path = export::export_to_dir(&store, Path::new(".")).await?;
//!
//! // Merge it into another store
//! let summary = import::import_file(&other, &path, ImportMode::Merge).await?;
//! ```
//!
//! # Modules
//!
//! - `models`: Website, Category, Tag, and Icon
//! - `codec`: icon bytes to base-64 text and back
//! - `snapshot`: the interchange document
//! - `export` / `import`: the two transfer directions
//! - `store`: storage trait and backends
//! - `config`: Application configuration

pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod snapshot;
pub mod store;

pub use config::Config;
pub use error::{TransferError, TransferResult};
pub use import::{ImportMode, ImportSummary};
pub use models::{Category, Icon, Tag, Website};
pub use snapshot::Snapshot;
pub use store::{CatalogStore, MemoryStore, SqliteStore, StoreError};
