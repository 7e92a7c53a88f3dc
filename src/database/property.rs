//! SQLite property store
//!
//! Stores schema properties as name/value rows in the property table, which
//! doubles as the sentinel table for "the schema has been created".

use rusqlite::{Connection, OptionalExtension};

use crate::database::connection::table_exists;
use crate::error::{Result, SchemaError};
use crate::schema::{PropertyAccess, SchemaProbe, PROPERTY_TABLE};

/// Property access backed by a SQLite table with `name`, `value` and `rev` columns
pub struct SqlitePropertyStore<'a> {
    conn: &'a Connection,
    table: String,
}

impl<'a> SqlitePropertyStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self::with_table(conn, PROPERTY_TABLE)
    }

    pub fn with_table(conn: &'a Connection, table: &str) -> Self {
        Self {
            conn,
            table: table.to_string(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// All properties, ordered by name
    pub fn entries(&self) -> Result<Vec<(String, Option<String>)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT name, value FROM {} ORDER BY name",
            quote_ident(&self.table)
        ))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Fails with `MissingProperty` when the table lacks the name/value columns
    fn ensure_readable(&self, key: &str) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map([&self.table], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let has = |col: &str| columns.iter().any(|c| c.eq_ignore_ascii_case(col));
        if has("name") && has("value") {
            Ok(())
        } else {
            Err(SchemaError::MissingProperty {
                key: key.to_string(),
            })
        }
    }
}

impl PropertyAccess for SqlitePropertyStore<'_> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.ensure_readable(key)?;

        let value: Option<Option<String>> = self
            .conn
            .query_row(
                &format!(
                    "SELECT value FROM {} WHERE name = ?1",
                    quote_ident(&self.table)
                ),
                [key],
                |row| row.get(0),
            )
            .optional()?;

        // a row with a NULL value is present but unusable
        Ok(value.map(Option::unwrap_or_default))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (name, value, rev) VALUES (?1, ?2, 1)
                 ON CONFLICT(name) DO UPDATE SET value = excluded.value, rev = rev + 1",
                quote_ident(&self.table)
            ),
            [key, value],
        )?;
        Ok(())
    }
}

impl SchemaProbe for SqlitePropertyStore<'_> {
    fn table_exists(&self, table: &str) -> Result<bool> {
        table_exists(self.conn, table)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseConn;

    fn create_test_db() -> DatabaseConn {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute(
            "CREATE TABLE schema_property (name TEXT PRIMARY KEY, value TEXT, rev INTEGER NOT NULL DEFAULT 1)",
        )
        .unwrap();
        db
    }

    #[test]
    fn test_get_and_set() {
        let db = create_test_db();
        let store = SqlitePropertyStore::new(&db.conn);

        assert_eq!(store.get("common.schema.version").unwrap(), None);

        store.set("common.schema.version", "6.2.0.0").unwrap();
        assert_eq!(
            store.get("common.schema.version").unwrap(),
            Some("6.2.0.0".to_string())
        );

        store.set("common.schema.version", "6.4.0.0").unwrap();
        assert_eq!(
            store.get("common.schema.version").unwrap(),
            Some("6.4.0.0".to_string())
        );
    }

    #[test]
    fn test_set_increments_rev() {
        let db = create_test_db();
        let store = SqlitePropertyStore::new(&db.conn);

        store.set("k", "a").unwrap();
        store.set("k", "b").unwrap();
        store.set("k", "c").unwrap();

        let rev: i64 = db
            .conn
            .query_row("SELECT rev FROM schema_property WHERE name = 'k'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(rev, 3);
    }

    #[test]
    fn test_null_value_reads_as_empty() {
        let db = create_test_db();
        db.execute("INSERT INTO schema_property (name, value) VALUES ('k', NULL)")
            .unwrap();
        let store = SqlitePropertyStore::new(&db.conn);

        assert_eq!(store.get("k").unwrap(), Some(String::new()));
    }

    #[test]
    fn test_malformed_table_is_missing_property() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE schema_property (id INTEGER PRIMARY KEY)")
            .unwrap();
        let store = SqlitePropertyStore::new(&db.conn);

        match store.get("common.schema.version") {
            Err(SchemaError::MissingProperty { key }) => {
                assert_eq!(key, "common.schema.version")
            }
            other => panic!("expected MissingProperty, got {:?}", other),
        }
    }

    #[test]
    fn test_probe_and_entries() {
        let db = create_test_db();
        let store = SqlitePropertyStore::new(&db.conn);

        assert!(store.table_exists("schema_property").unwrap());
        assert!(!store.table_exists("missing").unwrap());

        store.set("b", "2").unwrap();
        store.set("a", "1").unwrap();
        assert_eq!(
            store.entries().unwrap(),
            vec![
                ("a".to_string(), Some("1".to_string())),
                ("b".to_string(), Some("2".to_string()))
            ]
        );
    }

    #[test]
    fn test_custom_table() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE \"app props\" (name TEXT PRIMARY KEY, value TEXT, rev INTEGER)")
            .unwrap();
        let store = SqlitePropertyStore::with_table(&db.conn, "app props");

        store.set("x", "y").unwrap();
        assert_eq!(store.get("x").unwrap(), Some("y".to_string()));
        assert_eq!(store.table(), "app props");
    }
}
