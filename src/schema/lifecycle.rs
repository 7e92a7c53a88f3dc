//! Schema lifecycle decisions
//!
//! [`SchemaLifecycle`] looks at a store, works out where its schema stands
//! relative to a [`VersionCatalog`], and drives the create, drop, or upgrade
//! scripts needed to bring it to the current version.
//!
//! Two comparisons are used on purpose:
//! - create and validate require the stored identifier to equal the current
//!   identifier exactly, so any drift is refused;
//! - update compares catalog ordinals, so an older store is walked forward one
//!   boundary at a time.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, SchemaError};
use crate::schema::interfaces::{PropertyAccess, SchemaProbe, ScriptOutcome, ScriptRunner};
use crate::schema::resolver::{SchemaVersionResolver, MODERN_VERSION_KEY};
use crate::schema::strategy::SchemaStrategy;
use crate::schema::version::VersionCatalog;

/// Table whose presence means the schema has been created at least once
pub const PROPERTY_TABLE: &str = "schema_property";

pub const CREATE_DIRECTORY: &str = "create";
pub const DROP_DIRECTORY: &str = "drop";
pub const UPGRADE_DIRECTORY: &str = "upgrade";

/// Snapshot of a store's schema, computed fresh on every call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbState {
    pub schema_tables_exist: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_version: Option<String>,
}

/// Drives schema creation, removal, and upgrades against a store
///
/// Holds only borrowed collaborators and the catalog; nothing is cached
/// between calls, since the store may change out of band.
pub struct SchemaLifecycle<'a> {
    catalog: &'a VersionCatalog,
    probe: &'a dyn SchemaProbe,
    properties: &'a dyn PropertyAccess,
    scripts: &'a dyn ScriptRunner,
    resolver: SchemaVersionResolver,
    sentinel_table: String,
    component: Option<String>,
}

impl<'a> SchemaLifecycle<'a> {
    pub fn new(
        catalog: &'a VersionCatalog,
        probe: &'a dyn SchemaProbe,
        properties: &'a dyn PropertyAccess,
        scripts: &'a dyn ScriptRunner,
    ) -> Self {
        Self {
            catalog,
            probe,
            properties,
            scripts,
            resolver: SchemaVersionResolver::new(),
            sentinel_table: PROPERTY_TABLE.to_string(),
            component: None,
        }
    }

    /// Use a different table as the "schema exists" sentinel
    pub fn with_sentinel_table(mut self, table: impl Into<String>) -> Self {
        self.sentinel_table = table.into();
        self
    }

    /// Component passed to every script request; `None` leaves it to the runner
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn catalog(&self) -> &VersionCatalog {
        self.catalog
    }

    /// Probe the store and resolve its version without changing anything
    pub fn state(&self) -> Result<DbState> {
        let schema_tables_exist = self.probe.table_exists(&self.sentinel_table)?;
        let resolved_version = if schema_tables_exist {
            Some(self.resolver.resolve(self.properties)?)
        } else {
            None
        };

        Ok(DbState {
            schema_tables_exist,
            resolved_version,
        })
    }

    /// Create the schema if absent, otherwise require it to be at the current version
    ///
    /// The create script stamps the version property itself; this method never
    /// writes it.
    pub fn create_schema(&self) -> Result<()> {
        match self.state()?.resolved_version {
            None => {
                info!(
                    "creating schema at version {}",
                    self.catalog.current_version()
                );
                self.run_mandatory(CREATE_DIRECTORY, "create")
            }
            Some(found) => self.ensure_current(found),
        }
    }

    /// Run the drop script unconditionally
    pub fn drop_schema(&self) -> Result<()> {
        info!("dropping schema");
        self.run_mandatory(DROP_DIRECTORY, "drop")
    }

    /// Bring the schema to the current version
    ///
    /// Returns `None` when nothing had to be upgraded (including a fresh
    /// create), or a feedback message naming the old and new versions.
    /// If any step fails the version property is left untouched, so a later
    /// call starts again from the last recorded version.
    pub fn update_schema(&self) -> Result<Option<String>> {
        let found = match self.state()?.resolved_version {
            None => {
                self.create_schema()?;
                return Ok(None);
            }
            Some(found) => found,
        };

        let ordinal = self.catalog.ordinal_of(&found)?;
        if self.catalog.is_up_to_date(ordinal) {
            info!("schema is current at version {}", found);
            return Ok(None);
        }

        let current = self.catalog.current_version();
        info!("upgrading schema from {} to {}", found, current);

        for step in self.catalog.upgrade_steps(ordinal) {
            let operation = step.operation();
            info!("upgrade step {} -> {}", step.from, step.to);
            match self
                .scripts
                .run(UPGRADE_DIRECTORY, &operation, self.component.as_deref())?
            {
                ScriptOutcome::Executed => debug!("applied {}/{}", UPGRADE_DIRECTORY, operation),
                ScriptOutcome::NotFound => info!(
                    "no {}/{} resource, nothing to apply for this step",
                    UPGRADE_DIRECTORY, operation
                ),
            }
        }

        self.properties.set(MODERN_VERSION_KEY, current.id())?;
        info!("schema version set to {}", current);

        Ok(Some(format!("upgraded from {} to {}", found, current.id())))
    }

    /// Require an existing schema at exactly the current version
    pub fn validate_schema(&self) -> Result<()> {
        match self.state()?.resolved_version {
            None => Err(SchemaError::SchemaMissing {
                table: self.sentinel_table.clone(),
            }),
            Some(found) => self.ensure_current(found),
        }
    }

    /// Apply a strategy's startup action, returning any upgrade feedback
    pub fn apply_startup(&self, strategy: SchemaStrategy) -> Result<Option<String>> {
        debug!("applying startup strategy {}", strategy);
        match strategy {
            SchemaStrategy::Validate => self.validate_schema().map(|_| None),
            SchemaStrategy::Create | SchemaStrategy::CreateDrop => {
                self.create_schema().map(|_| None)
            }
            SchemaStrategy::Update => self.update_schema(),
            SchemaStrategy::DropCreate => {
                self.drop_schema()?;
                self.create_schema().map(|_| None)
            }
        }
    }

    /// Apply a strategy's shutdown action
    pub fn apply_shutdown(&self, strategy: SchemaStrategy) -> Result<()> {
        if strategy.drops_on_shutdown() {
            self.drop_schema()?;
        }
        Ok(())
    }

    fn ensure_current(&self, found: String) -> Result<()> {
        let expected = self.catalog.current_version().id();
        if found != expected {
            return Err(SchemaError::VersionMismatch {
                expected: expected.to_string(),
                found,
            });
        }
        debug!("schema already at version {}", found);
        Ok(())
    }

    fn run_mandatory(&self, directory: &str, operation: &str) -> Result<()> {
        match self
            .scripts
            .run(directory, operation, self.component.as_deref())?
        {
            ScriptOutcome::Executed => Ok(()),
            ScriptOutcome::NotFound => Err(SchemaError::ScriptExecution {
                resource: format!("{}/{}", directory, operation),
                message: "required script resource not found".to_string(),
            }),
        }
    }
}
