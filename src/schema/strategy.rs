//! Startup/shutdown schema strategies

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a host does with the schema when it starts and stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaStrategy {
    /// Require an existing schema at exactly the current version
    Validate,
    /// Create when absent, otherwise require the current version
    Create,
    /// Create when absent, otherwise upgrade to the current version
    #[default]
    Update,
    /// Drop any existing schema, then create it fresh
    DropCreate,
    /// Create at startup and drop again at shutdown
    CreateDrop,
}

impl SchemaStrategy {
    pub fn all() -> Vec<SchemaStrategy> {
        vec![
            SchemaStrategy::Validate,
            SchemaStrategy::Create,
            SchemaStrategy::Update,
            SchemaStrategy::DropCreate,
            SchemaStrategy::CreateDrop,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchemaStrategy::Validate => "validate",
            SchemaStrategy::Create => "create",
            SchemaStrategy::Update => "update",
            SchemaStrategy::DropCreate => "drop-create",
            SchemaStrategy::CreateDrop => "create-drop",
        }
    }

    /// Whether the strategy drops the schema when the host shuts down
    pub fn drops_on_shutdown(&self) -> bool {
        matches!(self, SchemaStrategy::CreateDrop)
    }
}

impl std::fmt::Display for SchemaStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SchemaStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "validate" | "false" => Ok(SchemaStrategy::Validate),
            "create" => Ok(SchemaStrategy::Create),
            "update" | "true" => Ok(SchemaStrategy::Update),
            "drop-create" => Ok(SchemaStrategy::DropCreate),
            "create-drop" => Ok(SchemaStrategy::CreateDrop),
            other => Err(format!(
                "unknown schema strategy '{}', expected one of: {}",
                other,
                Self::all()
                    .iter()
                    .map(|s| s.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}
