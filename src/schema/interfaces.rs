//! Collaborator interfaces
//!
//! The lifecycle core never talks to a database directly. It asks three
//! services for what it needs: whether the sentinel table exists, what a
//! property holds, and to run a named script. The crate provides SQLite
//! implementations in [`crate::database`]; hosts with another store supply
//! their own.

use crate::error::Result;

/// Table-existence check
pub trait SchemaProbe {
    /// Reflects the store at call time; must not modify anything
    fn table_exists(&self, table: &str) -> Result<bool>;
}

/// Key/value access to the persisted property store
pub trait PropertyAccess {
    /// Returns `Ok(None)` when the key is unset; an unset key is never an error
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrites any existing value; durable once it returns
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// What happened when a script resource was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// The resource was found and applied in full
    Executed,
    /// No resource exists under the composed name; nothing was applied
    NotFound,
}

/// Executes named, versioned script resources against the store
///
/// The caller supplies a logical directory (`create`, `drop`, `upgrade`) and
/// an operation name. Mapping that pair to a concrete resource for the
/// store's dialect is the runner's job. A script is applied entirely or not
/// at all; any SQL failure is reported as
/// [`SchemaError::ScriptExecution`](crate::SchemaError::ScriptExecution).
pub trait ScriptRunner {
    fn run(&self, directory: &str, operation: &str, component: Option<&str>)
        -> Result<ScriptOutcome>;
}
