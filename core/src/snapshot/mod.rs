//! JSON snapshots of registry state.
//!
//! A snapshot captures everything a registry holds: every node, its
//! declarations with their options, and its explicit entries, including
//! explicit nil (JSON null — something the TOML scheme format cannot
//! express). Nodes are emitted in creation order, so a parent always
//! precedes its children and [`Snapshot::restore`] rebuilds the forest in a
//! single pass.

use crate::registry::{Registry, error::RegistryError};
use crate::types::{DeclareOptions, SettingKey, SettingKeyError, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown parent {parent:?} for node {node:?}")]
    UnknownParent { node: String, parent: String },

    #[error("invalid setting key: {0}")]
    InvalidKey(#[from] SettingKeyError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Full registry state, persisted as JSON.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<NodeState>,
}

/// One node's captured state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeState {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub declarations: BTreeMap<String, DeclareOptions>,
    #[serde(default)]
    pub entries: BTreeMap<String, Value>,
}

impl Registry {
    /// Captures the registry's full state.
    pub fn snapshot(&self) -> Snapshot {
        let nodes = self
            .node_ids()
            .map(|id| NodeState {
                name: self.name(id).to_string(),
                parent: self.parent(id).map(|p| self.name(p).to_string()),
                declarations: self
                    .own_declarations(id)
                    .map(|(key, options)| (key.to_string(), options))
                    .collect(),
                entries: self
                    .own_entries(id)
                    .map(|(key, value)| (key.to_string(), value.clone()))
                    .collect(),
            })
            .collect();

        Snapshot { nodes }
    }
}

impl Snapshot {
    /// Rebuilds a registry equivalent to the captured one.
    ///
    /// Nodes must appear parent-first, which [`Registry::snapshot`]
    /// guarantees; a hand-edited document that breaks the order fails with
    /// [`SnapshotError::UnknownParent`].
    pub fn restore(&self) -> Result<Registry, SnapshotError> {
        let mut registry = Registry::new();

        for state in &self.nodes {
            let node = match &state.parent {
                None => registry.add_root(&state.name)?,
                Some(parent) => {
                    let parent_id =
                        registry
                            .node_id(parent)
                            .map_err(|_| SnapshotError::UnknownParent {
                                node: state.name.clone(),
                                parent: parent.clone(),
                            })?;
                    registry.add_child(parent_id, &state.name)?
                }
            };

            for (key, options) in &state.declarations {
                let key = SettingKey::try_from(key.as_str())?;
                registry.declare_with(node, key, *options);
            }

            // Parents precede children, so inherited declarations are
            // already in place when entries are applied.
            for (key, value) in &state.entries {
                let key = SettingKey::try_from(key.as_str())?;
                registry.set(node, &key, value.clone())?;
            }
        }

        Ok(registry)
    }

    /// Loads a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&content)?)
    }

    /// Saves the snapshot to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let content = self.to_json_string()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
