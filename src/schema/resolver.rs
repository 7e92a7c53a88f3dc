//! Persisted version resolution
//!
//! Releases from 6.2.0 onward record the schema version under
//! [`MODERN_VERSION_KEY`]. Earlier releases only ever wrote
//! [`LEGACY_VERSION_KEY`], so a store without the modern key is assumed to be
//! at [`FLOOR_VERSION`], the last version before the modern key existed. The
//! legacy value itself is never read.

use crate::error::{Result, SchemaError};
use crate::schema::interfaces::PropertyAccess;
use crate::schema::version::FLOOR_VERSION;

/// Property key written by 6.2.0 and later
pub const MODERN_VERSION_KEY: &str = "common.schema.version";

/// Property key written by releases before 6.2.0
pub const LEGACY_VERSION_KEY: &str = "schema.version";

/// Reads the schema version a store was last stamped with
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaVersionResolver;

impl SchemaVersionResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the persisted version identifier
    ///
    /// Returns the modern key's value verbatim, or [`FLOOR_VERSION`] when the
    /// modern key is absent. A modern key holding only whitespace is not a
    /// usable marker and yields [`SchemaError::MissingProperty`].
    pub fn resolve(&self, properties: &dyn PropertyAccess) -> Result<String> {
        match properties.get(MODERN_VERSION_KEY)? {
            Some(value) if value.trim().is_empty() => Err(SchemaError::MissingProperty {
                key: MODERN_VERSION_KEY.to_string(),
            }),
            Some(value) => Ok(value),
            None => Ok(FLOOR_VERSION.to_string()),
        }
    }
}
