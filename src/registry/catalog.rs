use super::{Migration, NodeTypeDefinition, NodeTypeRegistry};
use crate::error::RegistryError;
use ahash::AHashMap;
use serde::Deserialize;
use std::fs;

/// An immutable, in-memory node type registry.
///
/// Built once through [`NodeCatalogBuilder`] or loaded from JSON, then shared behind a
/// reference or an `Arc`. There is no way to mutate a catalog after it has been built.
#[derive(Debug, Clone, Default)]
pub struct NodeCatalog {
    types: AHashMap<String, NodeTypeDefinition>,
    migrations: AHashMap<String, Vec<Migration>>,
}

/// On-disk shape of a catalog.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCatalog {
    #[serde(default)]
    node_types: Vec<NodeTypeDefinition>,
    #[serde(default)]
    migrations: Vec<Migration>,
}

pub struct NodeCatalogBuilder {
    types: Vec<NodeTypeDefinition>,
    migrations: Vec<Migration>,
}

impl NodeCatalogBuilder {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            migrations: Vec::new(),
        }
    }

    pub fn with_node_type(mut self, definition: NodeTypeDefinition) -> Self {
        self.types.push(definition);
        self
    }

    pub fn with_migration(mut self, migration: Migration) -> Self {
        self.migrations.push(migration);
        self
    }

    /// Checks the collected entries for consistency and freezes them into a catalog.
    pub fn build(self) -> Result<NodeCatalog, RegistryError> {
        let mut types: AHashMap<String, NodeTypeDefinition> = AHashMap::new();
        for definition in self.types {
            if definition.node_type.trim().is_empty() {
                return Err(RegistryError::EmptyNodeType(definition.node_type));
            }
            if types.contains_key(&definition.node_type) {
                return Err(RegistryError::DuplicateNodeType(definition.node_type));
            }
            types.insert(definition.node_type.clone(), definition);
        }

        let mut migrations: AHashMap<String, Vec<Migration>> = AHashMap::new();
        for migration in self.migrations {
            if !types.contains_key(&migration.to_type) {
                return Err(RegistryError::UnknownMigrationTarget {
                    from_type: migration.from_type,
                    to_type: migration.to_type,
                    to_version: migration.to_version,
                });
            }
            let entries = migrations.entry(migration.from_type.clone()).or_default();
            if entries
                .iter()
                .any(|m| m.from_version == migration.from_version)
            {
                return Err(RegistryError::DuplicateMigration {
                    from_type: migration.from_type,
                    from_version: migration.from_version,
                });
            }
            entries.push(migration);
        }

        tracing::debug!(
            node_types = types.len(),
            migrations = migrations.values().map(Vec::len).sum::<usize>(),
            "Built node catalog"
        );
        Ok(NodeCatalog { types, migrations })
    }
}

impl Default for NodeCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeCatalog {
    pub fn builder() -> NodeCatalogBuilder {
        NodeCatalogBuilder::new()
    }

    /// Parses a catalog from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let raw: RawCatalog =
            serde_json::from_str(json).map_err(|e| RegistryError::JsonParseError(e.to_string()))?;
        raw.migrations
            .into_iter()
            .fold(
                raw.node_types
                    .into_iter()
                    .fold(Self::builder(), NodeCatalogBuilder::with_node_type),
                NodeCatalogBuilder::with_migration,
            )
            .build()
    }

    /// Loads a catalog from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, RegistryError> {
        let content = fs::read_to_string(path).map_err(|e| RegistryError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// All registered type names, sorted.
    pub fn node_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl NodeTypeRegistry for NodeCatalog {
    fn lookup(&self, node_type: &str) -> Option<&NodeTypeDefinition> {
        self.types.get(node_type)
    }

    fn migration(&self, node_type: &str, version: u32) -> Option<&Migration> {
        let candidates = self.migrations.get(node_type)?;
        candidates
            .iter()
            .find(|m| m.from_version == Some(version))
            .or_else(|| candidates.iter().find(|m| m.from_version.is_none()))
    }

    fn len(&self) -> usize {
        self.types.len()
    }
}
