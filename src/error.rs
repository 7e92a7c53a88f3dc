//! Error types for schema lifecycle operations
//!
//! Every failure the decision core can produce is a variant of [`SchemaError`].
//! None of them are retried or suppressed internally; callers are expected to
//! abort startup and let a supervisor restart the process.

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, SchemaError>;

#[derive(Error, Debug)]
pub enum SchemaError {
    /// The persisted version is not part of the running code's version history
    #[error("unknown schema version '{version}': not present in the version catalog")]
    UnknownVersion { version: String },

    /// An existing schema is at a different version than the running code expects
    #[error("schema version mismatch: library expects '{expected}', store is at '{found}'")]
    VersionMismatch { expected: String, found: String },

    /// The sentinel table exists but no usable version marker could be read
    #[error("no usable '{key}' property found in the property table")]
    MissingProperty { key: String },

    /// A script resource failed to apply
    #[error("failed to execute script '{resource}': {message}")]
    ScriptExecution { resource: String, message: String },

    /// Validation requested against a store that was never created
    #[error("schema not initialized: table '{table}' does not exist")]
    SchemaMissing { table: String },

    /// Version catalog construction rejected its input
    #[error("invalid version catalog: {0}")]
    InvalidCatalog(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
