//! In-memory collaborators for unit tests

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::{Result, SchemaError};
use crate::schema::interfaces::{PropertyAccess, SchemaProbe, ScriptOutcome, ScriptRunner};
use crate::schema::resolver::MODERN_VERSION_KEY;

/// Property map that counts writes made through [`PropertyAccess::set`]
#[derive(Debug, Default)]
pub struct MemoryProperties {
    values: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
}

impl MemoryProperties {
    pub fn with(pairs: &[(&str, &str)]) -> Self {
        let props = Self::default();
        for (k, v) in pairs {
            props
                .values
                .borrow_mut()
                .insert(k.to_string(), v.to_string());
        }
        props
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Direct write that bypasses the counter, as a script would
    fn stamp(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn clear(&self) {
        self.values.borrow_mut().clear();
    }
}

impl PropertyAccess for MemoryProperties {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.writes.set(self.writes.get() + 1);
        self.stamp(key, value);
        Ok(())
    }
}

/// A whole fake store: sentinel flag, properties, and a recording script runner
///
/// The `create` script marks the sentinel present and stamps the modern key
/// with `create_stamp`; the `drop` script clears everything.
#[derive(Debug, Default)]
pub struct FakeStore {
    pub props: MemoryProperties,
    tables: Cell<bool>,
    create_stamp: String,
    runs: RefCell<Vec<(String, String, Option<String>)>>,
    fail_on: Option<String>,
    missing: Vec<String>,
}

impl FakeStore {
    /// A store with no schema; `create` will stamp `create_stamp`
    pub fn empty(create_stamp: &str) -> Self {
        Self {
            create_stamp: create_stamp.to_string(),
            ..Default::default()
        }
    }

    /// A store whose sentinel exists and whose properties hold `pairs`
    pub fn existing(pairs: &[(&str, &str)], create_stamp: &str) -> Self {
        let store = Self::empty(create_stamp);
        store.tables.set(true);
        for (k, v) in pairs {
            store.props.stamp(k, v);
        }
        store
    }

    /// Make the script with this operation name fail
    pub fn failing_on(mut self, operation: &str) -> Self {
        self.fail_on = Some(operation.to_string());
        self
    }

    /// Report the script with this operation name as absent
    pub fn missing(mut self, operation: &str) -> Self {
        self.missing.push(operation.to_string());
        self
    }

    pub fn tables_exist(&self) -> bool {
        self.tables.get()
    }

    /// `directory/operation` for every script requested, in order
    pub fn runs(&self) -> Vec<String> {
        self.runs
            .borrow()
            .iter()
            .map(|(dir, op, _)| format!("{}/{}", dir, op))
            .collect()
    }

    pub fn components(&self) -> Vec<Option<String>> {
        self.runs.borrow().iter().map(|(_, _, c)| c.clone()).collect()
    }

    pub fn version(&self) -> Option<String> {
        self.props.values.borrow().get(MODERN_VERSION_KEY).cloned()
    }
}

impl SchemaProbe for FakeStore {
    fn table_exists(&self, _table: &str) -> Result<bool> {
        Ok(self.tables.get())
    }
}

impl PropertyAccess for FakeStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.props.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.props.set(key, value)
    }
}

impl ScriptRunner for FakeStore {
    fn run(
        &self,
        directory: &str,
        operation: &str,
        component: Option<&str>,
    ) -> Result<ScriptOutcome> {
        self.runs.borrow_mut().push((
            directory.to_string(),
            operation.to_string(),
            component.map(str::to_string),
        ));

        if self.fail_on.as_deref() == Some(operation) {
            return Err(SchemaError::ScriptExecution {
                resource: format!("{}/{}", directory, operation),
                message: "injected failure".to_string(),
            });
        }
        if self.missing.iter().any(|m| m == operation) {
            return Ok(ScriptOutcome::NotFound);
        }

        match operation {
            "create" => {
                self.tables.set(true);
                self.props.stamp(MODERN_VERSION_KEY, &self.create_stamp);
            }
            "drop" => {
                self.tables.set(false);
                self.props.clear();
            }
            _ => {}
        }
        Ok(ScriptOutcome::Executed)
    }
}
