//! Schema version history
//!
//! A [`VersionCatalog`] is the ordered, append-only list of every schema
//! version this library has ever shipped. The last entry is the current
//! version. Catalogs are plain values: the orchestrator receives one by
//! reference, so tests can run against small synthetic histories.

use crate::error::{Result, SchemaError};

/// Last version that predates the modern version property.
pub const FLOOR_VERSION: &str = "6.1.2.0";

/// Version history matching the scripts bundled under `sql/`
pub const BUNDLED_VERSIONS: &[&str] = &["6.1.2.0", "6.2.0.0", "6.3.0.0", "6.4.0.0"];

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// One release's schema shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaVersion {
    id: String,
    aliases: Vec<String>,
    ordinal: usize,
}

impl SchemaVersion {
    /// Main identifier, e.g. `6.2.0.0`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Alternative spellings written by older releases
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Zero-based position in the catalog
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Whether `version` names this entry, by main identifier or alias
    pub fn matches(&self, version: &str) -> bool {
        self.id == version || self.aliases.iter().any(|a| a == version)
    }

    /// Identifier as used in upgrade-step resource names: snapshot suffix and dots removed
    pub fn step_token(&self) -> String {
        self.id
            .strip_suffix(SNAPSHOT_SUFFIX)
            .unwrap_or(&self.id)
            .replace('.', "")
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// A single version boundary crossed by an upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeStep<'a> {
    pub from: &'a SchemaVersion,
    pub to: &'a SchemaVersion,
}

impl UpgradeStep<'_> {
    /// Operation name of the step script, e.g. `upgradestep.6120.to.6200`
    pub fn operation(&self) -> String {
        format!(
            "upgradestep.{}.to.{}",
            self.from.step_token(),
            self.to.step_token()
        )
    }
}

/// Immutable, ordered registry of known schema versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCatalog {
    versions: Vec<SchemaVersion>,
}

impl VersionCatalog {
    pub fn builder() -> VersionCatalogBuilder {
        VersionCatalogBuilder::default()
    }

    /// Build a catalog from identifiers in release order
    pub fn from_ids<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter()
            .fold(Self::builder(), |builder, id| builder.version(id))
            .build()
    }

    /// Catalog for the scripts compiled into this crate
    pub fn bundled() -> Result<Self> {
        Self::from_ids(BUNDLED_VERSIONS.iter().copied())
    }

    /// Ordinal of `version`, matched against identifiers and aliases
    pub fn ordinal_of(&self, version: &str) -> Result<usize> {
        self.versions
            .iter()
            .position(|v| v.matches(version))
            .ok_or_else(|| SchemaError::UnknownVersion {
                version: version.to_string(),
            })
    }

    /// The latest version; always the tail of the catalog
    pub fn current_version(&self) -> &SchemaVersion {
        // the builder rejects empty catalogs
        &self.versions[self.versions.len() - 1]
    }

    pub fn is_up_to_date(&self, index: usize) -> bool {
        index == self.versions.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&SchemaVersion> {
        self.versions.get(index)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaVersion> {
        self.versions.iter()
    }

    /// Every boundary between `from_ordinal` and the current version, in ascending order
    pub fn upgrade_steps(&self, from_ordinal: usize) -> Vec<UpgradeStep<'_>> {
        self.versions
            .get(from_ordinal..)
            .unwrap_or_default()
            .windows(2)
            .map(|pair| UpgradeStep {
                from: &pair[0],
                to: &pair[1],
            })
            .collect()
    }
}

/// Collects versions in release order and validates them into a [`VersionCatalog`]
#[derive(Debug, Default)]
pub struct VersionCatalogBuilder {
    entries: Vec<(String, Vec<String>)>,
}

impl VersionCatalogBuilder {
    pub fn version(mut self, id: impl Into<String>) -> Self {
        self.entries.push((id.into(), Vec::new()));
        self
    }

    pub fn version_with_aliases<I, S>(mut self, id: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .push((id.into(), aliases.into_iter().map(Into::into).collect()));
        self
    }

    pub fn build(self) -> Result<VersionCatalog> {
        if self.entries.is_empty() {
            return Err(SchemaError::InvalidCatalog(
                "catalog must contain at least one version".to_string(),
            ));
        }

        let mut seen: Vec<&str> = Vec::new();
        for (id, aliases) in &self.entries {
            for name in std::iter::once(id).chain(aliases.iter()) {
                if name.trim().is_empty() {
                    return Err(SchemaError::InvalidCatalog(
                        "version identifiers must not be empty".to_string(),
                    ));
                }
                if seen.contains(&name.as_str()) {
                    return Err(SchemaError::InvalidCatalog(format!(
                        "duplicate version identifier '{}'",
                        name
                    )));
                }
                seen.push(name);
            }
        }

        let versions = self
            .entries
            .into_iter()
            .enumerate()
            .map(|(ordinal, (id, aliases))| SchemaVersion {
                id,
                aliases,
                ordinal,
            })
            .collect();

        Ok(VersionCatalog { versions })
    }
}
