use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::database::{ScriptSource, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_COMPONENT};
use crate::schema::SchemaStrategy;

const CONFIG_DIR_NAME: &str = ".schema-lifecycle";
const CONFIG_FILE_NAME: &str = "schema-lifecycle.toml";
const DATABASE_FILE_NAME: &str = "store.sqlite3";

const EMPTY_CONFIG: &str = r#"### schema-lifecycle configuration file

### SQLite database whose schema is managed
# database_path = "~/.schema-lifecycle/store.sqlite3"

### directory holding create/, drop/ and upgrade/ scripts
### (the scripts compiled into the binary are used when unset)
# script_dir = "/etc/schema-lifecycle/sql"

### component name used in script resource names
# component = "common"

### startup strategy: validate, create, update, drop-create, create-drop
# strategy = "update"

### how long to wait on a locked database, in milliseconds
# busy_timeout_ms = 5000
"#;

pub struct LifecycleConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// Script directory, `None` for the embedded scripts
    pub script_dir: Option<String>,

    pub component: String,

    pub strategy: SchemaStrategy,

    pub busy_timeout_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            database_path: format!("{}/{}", default_config_dir(), DATABASE_FILE_NAME),
            script_dir: None,
            component: DEFAULT_COMPONENT.to_string(),
            strategy: SchemaStrategy::default(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl LifecycleConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<LifecycleConfig> {
        let mut builder = Config::builder();

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not find home directory"))?
                    .to_str()
                    .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
                    .to_owned();
                let config_dir = format!("{}/{}", home_dir, CONFIG_DIR_NAME);
                std::fs::create_dir_all(config_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create config directory: {}", e))?;

                let p = format!("{}/{}", config_dir, CONFIG_FILE_NAME);
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of SCHEMA_LIFECYCLE)
        // E.g., `SCHEMA_LIFECYCLE_STRATEGY=validate schema-lifecycle apply`
        builder = builder.add_source(config::Environment::with_prefix("SCHEMA_LIFECYCLE"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Self::from_map(&config)
    }

    fn from_map(config: &HashMap<String, String>) -> Result<LifecycleConfig> {
        let defaults = LifecycleConfig::default();

        let database_path = match config.get("database_path") {
            Some(p) => expand_home(p),
            None => {
                std::fs::create_dir_all(default_config_dir())
                    .map_err(|e| anyhow!("Unable to create data directory: {}", e))?;
                defaults.database_path
            }
        };

        let script_dir = config
            .get("script_dir")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(expand_home);

        let component = config
            .get("component")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.component);

        let strategy = match config.get("strategy") {
            Some(s) => s
                .parse::<SchemaStrategy>()
                .map_err(|e| anyhow!("Invalid strategy setting: {}", e))?,
            None => defaults.strategy,
        };

        let busy_timeout_ms = match config.get("busy_timeout_ms") {
            Some(s) => s
                .trim()
                .parse()
                .map_err(|e| anyhow!("Invalid busy_timeout_ms '{}': {}", s, e))?,
            None => defaults.busy_timeout_ms,
        };

        Ok(LifecycleConfig {
            database_path,
            script_dir,
            component,
            strategy,
            busy_timeout_ms,
        })
    }

    /// Where upgrade, create and drop scripts are loaded from
    pub fn script_source(&self) -> ScriptSource {
        match &self.script_dir {
            Some(dir) => ScriptSource::Directory(PathBuf::from(dir)),
            None => ScriptSource::Embedded,
        }
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        [
            format!("Database Path:      {}", self.database_path),
            format!("Scripts:            {}", self.script_source().describe()),
            format!("Component:          {}", self.component),
            format!("Strategy:           {}", self.strategy),
            format!("Busy Timeout:       {} ms", self.busy_timeout_ms),
        ]
        .join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        format!("{}/{}", default_config_dir(), CONFIG_FILE_NAME)
    }
}

fn default_config_dir() -> String {
    let home_dir = dirs::home_dir()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string());
    format!("{}/{}", home_dir, CONFIG_DIR_NAME)
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().to_string(),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = LifecycleConfig::default();
        assert!(config.database_path.ends_with(".schema-lifecycle/store.sqlite3"));
        assert_eq!(config.script_dir, None);
        assert_eq!(config.component, "common");
        assert_eq!(config.strategy, SchemaStrategy::Update);
        assert_eq!(config.busy_timeout_ms, 5000);
        assert_eq!(config.script_source(), ScriptSource::Embedded);
    }

    #[test]
    fn test_from_map() {
        let config = LifecycleConfig::from_map(&map(&[
            ("database_path", "/var/lib/app/store.sqlite3"),
            ("script_dir", "/etc/app/sql"),
            ("component", "engine"),
            ("strategy", "Drop-Create"),
            ("busy_timeout_ms", "250"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, "/var/lib/app/store.sqlite3");
        assert_eq!(
            config.script_source(),
            ScriptSource::Directory(PathBuf::from("/etc/app/sql"))
        );
        assert_eq!(config.component, "engine");
        assert_eq!(config.strategy, SchemaStrategy::DropCreate);
        assert_eq!(config.busy_timeout_ms, 250);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(LifecycleConfig::from_map(&map(&[
            ("database_path", "/tmp/x.sqlite3"),
            ("strategy", "sometimes"),
        ]))
        .is_err());
        assert!(LifecycleConfig::from_map(&map(&[
            ("database_path", "/tmp/x.sqlite3"),
            ("busy_timeout_ms", "soon"),
        ]))
        .is_err());
    }

    #[test]
    fn test_blank_script_dir_means_embedded() {
        let config = LifecycleConfig::from_map(&map(&[
            ("database_path", "/tmp/x.sqlite3"),
            ("script_dir", "  "),
        ]))
        .unwrap();
        assert_eq!(config.script_source(), ScriptSource::Embedded);
    }

    #[test]
    fn test_new_writes_template_then_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lifecycle.toml");
        let path_str = Some(path.to_string_lossy().to_string());

        // first load writes the commented template; nothing is set yet
        let _ = LifecycleConfig::new(&path_str);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("# strategy = \"update\""));

        let db_path = dir.path().join("store.sqlite3");
        std::fs::write(
            &path,
            format!(
                "database_path = \"{}\"\nstrategy = \"validate\"\nbusy_timeout_ms = 100\n",
                db_path.display()
            ),
        )
        .unwrap();

        let config = LifecycleConfig::new(&path_str).unwrap();
        assert_eq!(config.database_path, db_path.to_string_lossy());
        assert_eq!(config.strategy, SchemaStrategy::Validate);
        assert_eq!(config.busy_timeout_ms, 100);
    }

    #[test]
    fn test_summary_and_paths() {
        let config = LifecycleConfig {
            database_path: "/test/store.sqlite3".to_string(),
            script_dir: Some("/test/sql".to_string()),
            component: "common".to_string(),
            strategy: SchemaStrategy::CreateDrop,
            busy_timeout_ms: 10,
        };

        let summary = config.summary();
        assert!(summary.contains("/test/store.sqlite3"));
        assert!(summary.contains("/test/sql"));
        assert!(summary.contains("create-drop"));
        assert!(LifecycleConfig::config_file_path().ends_with("schema-lifecycle.toml"));
    }
}
