#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! schema-lifecycle - Schema version resolution and upgrade orchestration
//!
//! Works out which schema version a persistent store is at and brings it to
//! the version this library ships, by running create, drop, or per-version
//! upgrade scripts. It can be used as both a command-line application and a
//! library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `cli` (default) | The `schema-lifecycle` binary | `clap`, `dotenvy`, `tracing-subscriber` |
//!
//! ```toml
//! # Library only
//! schema-lifecycle = { version = "0.3", default-features = false }
//! ```
//!
//! # Architecture
//!
//! - **[`schema`]**: store-agnostic core
//!   - `version`: the ordered catalog of known versions and upgrade steps
//!   - `resolver`: reads the persisted version from store properties
//!   - `lifecycle`: create / drop / update / validate decisions
//!   - `strategy`: startup and shutdown policies
//! - **[`database`]**: SQLite collaborators and the bundled scripts
//! - **[`config`]**: configuration file and environment handling
//! - **[`error`]**: the library error type
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use schema_lifecycle::{
//!     DatabaseConn, SchemaLifecycle, ScriptSource, SqlitePropertyStore, SqliteScriptRunner,
//!     VersionCatalog,
//! };
//!
//! let db = DatabaseConn::open_path("store.sqlite3")?;
//! let catalog = VersionCatalog::bundled()?;
//! let store = SqlitePropertyStore::new(&db.conn);
//! let runner = SqliteScriptRunner::new(&db.conn, ScriptSource::Embedded);
//!
//! let lifecycle = SchemaLifecycle::new(&catalog, &store, &store, &runner);
//! lifecycle.update_schema()?;
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod schema;

pub use config::LifecycleConfig;
pub use database::{DatabaseConn, ScriptSource, SqlitePropertyStore, SqliteScriptRunner};
pub use error::{Result, SchemaError};
pub use schema::{
    DbState, PropertyAccess, SchemaLifecycle, SchemaProbe, SchemaStrategy, SchemaVersion,
    SchemaVersionResolver, ScriptOutcome, ScriptRunner, UpgradeStep, VersionCatalog,
};
