//! Schema version resolution and lifecycle decisions
//!
//! This module is the store-agnostic core:
//! - `version`: the ordered [`VersionCatalog`] of known releases
//! - `resolver`: reads the persisted version, with the pre-6.2.0 fallback
//! - `lifecycle`: [`SchemaLifecycle`], which decides between create, no-op, and upgrade
//! - `strategy`: startup/shutdown policies built on the lifecycle operations
//! - `interfaces`: the collaborator traits a store must implement
//!
//! # Usage
//!
//! ```rust,ignore
//! use schema_lifecycle::database::{DatabaseConn, ScriptSource, SqlitePropertyStore, SqliteScriptRunner};
//! use schema_lifecycle::schema::{SchemaLifecycle, VersionCatalog};
//!
//! let db = DatabaseConn::open_path("store.sqlite3")?;
//! let catalog = VersionCatalog::bundled()?;
//! let store = SqlitePropertyStore::new(&db.conn);
//! let runner = SqliteScriptRunner::new(&db.conn, ScriptSource::Embedded);
//!
//! let lifecycle = SchemaLifecycle::new(&catalog, &store, &store, &runner);
//! if let Some(feedback) = lifecycle.update_schema()? {
//!     println!("{}", feedback);
//! }
//! ```

mod interfaces;
mod lifecycle;
mod resolver;
mod strategy;
mod version;

#[cfg(test)]
pub(crate) mod testing;

pub use interfaces::{PropertyAccess, SchemaProbe, ScriptOutcome, ScriptRunner};
pub use lifecycle::{
    DbState, SchemaLifecycle, CREATE_DIRECTORY, DROP_DIRECTORY, PROPERTY_TABLE,
    UPGRADE_DIRECTORY,
};
pub use resolver::{SchemaVersionResolver, LEGACY_VERSION_KEY, MODERN_VERSION_KEY};
pub use strategy::SchemaStrategy;
pub use version::{
    SchemaVersion, UpgradeStep, VersionCatalog, VersionCatalogBuilder, BUNDLED_VERSIONS,
    FLOOR_VERSION,
};
