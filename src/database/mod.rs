//! Database module
//!
//! SQLite implementations of the collaborators the schema lifecycle needs:
//!
//! - **connection**: [`DatabaseConn`], the SQLite connection wrapper
//! - **property**: [`SqlitePropertyStore`], name/value properties and the sentinel probe
//! - **script**: [`SqliteScriptRunner`], resolves and applies create/drop/upgrade scripts
//!
//! # Script layout
//!
//! ```text
//! sql/
//! ├── create/   common.sqlite.create.sql
//! ├── drop/     common.sqlite.drop.sql
//! └── upgrade/  common.sqlite.upgradestep.<from>.to.<to>.sql
//! ```
//!
//! The same layout is expected when scripts are loaded from a directory with
//! [`ScriptSource::Directory`].

mod connection;
mod property;
mod script;

pub use connection::{DatabaseConn, DEFAULT_BUSY_TIMEOUT_MS};
pub use property::SqlitePropertyStore;
pub use script::{
    resource_path, ScriptSource, SqliteScriptRunner, DEFAULT_COMPONENT, SQLITE_DIALECT,
};
