//! SQLite script runner
//!
//! Resolves a `(directory, operation)` request to a SQL resource named
//! `{directory}/{component}.sqlite.{operation}.sql` and applies it inside a
//! single transaction. Scripts must therefore not contain their own
//! `BEGIN`/`COMMIT`.
//!
//! Resources come either from the scripts compiled into the crate (`sql/`)
//! or from a directory on disk laid out the same way.

use std::path::PathBuf;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::schema::{ScriptOutcome, ScriptRunner};

/// Dialect token used in resource names
pub const SQLITE_DIALECT: &str = "sqlite";

/// Component used when a request does not name one
pub const DEFAULT_COMPONENT: &str = "common";

/// Scripts shipped with the crate, keyed by resource path
const EMBEDDED_SCRIPTS: &[(&str, &str)] = &[
    (
        "create/common.sqlite.create.sql",
        include_str!("../../sql/create/common.sqlite.create.sql"),
    ),
    (
        "drop/common.sqlite.drop.sql",
        include_str!("../../sql/drop/common.sqlite.drop.sql"),
    ),
    (
        "upgrade/common.sqlite.upgradestep.6120.to.6200.sql",
        include_str!("../../sql/upgrade/common.sqlite.upgradestep.6120.to.6200.sql"),
    ),
    (
        "upgrade/common.sqlite.upgradestep.6300.to.6400.sql",
        include_str!("../../sql/upgrade/common.sqlite.upgradestep.6300.to.6400.sql"),
    ),
];

/// Compose the resource path for a script request
pub fn resource_path(directory: &str, component: &str, dialect: &str, operation: &str) -> String {
    format!("{}/{}.{}.{}.sql", directory, component, dialect, operation)
}

/// Where script resources are loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    /// Scripts compiled into the crate
    Embedded,
    /// A directory containing `create/`, `drop/` and `upgrade/` subdirectories
    Directory(PathBuf),
}

impl ScriptSource {
    /// Load a resource, `Ok(None)` if it does not exist
    pub fn load(&self, resource: &str) -> Result<Option<String>> {
        match self {
            ScriptSource::Embedded => Ok(EMBEDDED_SCRIPTS
                .iter()
                .find(|(path, _)| *path == resource)
                .map(|(_, sql)| sql.to_string())),
            ScriptSource::Directory(dir) => match std::fs::read_to_string(dir.join(resource)) {
                Ok(sql) => Ok(Some(sql)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            },
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ScriptSource::Embedded => "embedded".to_string(),
            ScriptSource::Directory(dir) => dir.display().to_string(),
        }
    }
}

/// Applies script resources to a SQLite connection
pub struct SqliteScriptRunner<'a> {
    conn: &'a Connection,
    source: ScriptSource,
    component: String,
}

impl<'a> SqliteScriptRunner<'a> {
    pub fn new(conn: &'a Connection, source: ScriptSource) -> Self {
        Self {
            conn,
            source,
            component: DEFAULT_COMPONENT.to_string(),
        }
    }

    /// Component used when a request does not name one
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    pub fn source(&self) -> &ScriptSource {
        &self.source
    }

    fn execute(&self, resource: &str, sql: &str) -> Result<()> {
        let failed = |e: rusqlite::Error| SchemaError::ScriptExecution {
            resource: resource.to_string(),
            message: e.to_string(),
        };

        let tx = self.conn.unchecked_transaction().map_err(failed)?;
        tx.execute_batch(sql).map_err(failed)?;
        tx.commit().map_err(failed)?;
        Ok(())
    }
}

impl ScriptRunner for SqliteScriptRunner<'_> {
    fn run(
        &self,
        directory: &str,
        operation: &str,
        component: Option<&str>,
    ) -> Result<ScriptOutcome> {
        let component = component.unwrap_or(self.component.as_str());
        let resource = resource_path(directory, component, SQLITE_DIALECT, operation);

        let Some(sql) = self.source.load(&resource)? else {
            debug!("script resource {} not found in {}", resource, self.source.describe());
            return Ok(ScriptOutcome::NotFound);
        };

        debug!("executing script resource {}", resource);
        self.execute(&resource, &sql)?;
        Ok(ScriptOutcome::Executed)
    }
}
