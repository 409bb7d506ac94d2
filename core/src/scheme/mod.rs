//! TOML scheme documents.
//!
//! A scheme is the human-authored description of a forest: nodes, their
//! parents, the settings they declare, and seed values. [`Scheme::build`]
//! turns a document into a live [`Registry`].
//!
//! TOML has no null, so a scheme cannot author an explicit nil entry; those
//! are reachable through the API and JSON snapshots only.

use crate::registry::{Registry, error::RegistryError};
use crate::types::{DeclareOptions, SettingKey, SettingKeyError, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown parent {parent:?} for node {node:?}")]
    UnknownParent { node: String, parent: String },

    #[error("invalid setting key: {0}")]
    InvalidKey(#[from] SettingKeyError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A forest description, persisted as TOML.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scheme {
    pub nodes: Vec<NodeSpec>,
}

/// One node of the forest.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSpec {
    pub name: String,
    /// Absent means the node is a root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub declare: Vec<DeclareSpec>,
    /// Seed entries, applied after every declaration in the document.
    pub values: BTreeMap<String, Value>,
}

/// A declaration inside a scheme: either a bare key or a detailed form.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeclareSpec {
    Key(String),
    Detailed {
        key: String,
        #[serde(default = "default_true")]
        instance_reader: bool,
    },
}

impl DeclareSpec {
    pub fn key(&self) -> &str {
        match self {
            DeclareSpec::Key(key) => key,
            DeclareSpec::Detailed { key, .. } => key,
        }
    }

    pub fn options(&self) -> DeclareOptions {
        match self {
            DeclareSpec::Key(_) => DeclareOptions::default(),
            DeclareSpec::Detailed {
                instance_reader, ..
            } => DeclareOptions {
                instance_reader: *instance_reader,
            },
        }
    }
}

fn default_true() -> bool {
    true
}

impl Scheme {
    /// Loads a scheme from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SchemeError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Saves the scheme to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), SchemeError> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Validates the document and returns the list of problems.
    /// Returns an empty vec if the scheme is well formed.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for node in &self.nodes {
            if node.name.trim().is_empty() {
                errors.push("node with empty name".to_string());
            } else if !seen.insert(node.name.as_str()) {
                errors.push(format!("duplicate node name: {}", node.name));
            }
        }

        let parents: HashMap<&str, Option<&str>> = self
            .nodes
            .iter()
            .map(|node| (node.name.as_str(), node.parent.as_deref()))
            .collect();

        for node in &self.nodes {
            if let Some(parent) = &node.parent {
                if !parents.contains_key(parent.as_str()) {
                    errors.push(format!(
                        "node {} references unknown parent {}",
                        node.name, parent
                    ));
                }
            }

            for spec in &node.declare {
                if let Err(e) = SettingKey::try_from(spec.key()) {
                    errors.push(format!(
                        "node {}: invalid key {:?}: {}",
                        node.name,
                        spec.key(),
                        e
                    ));
                }
            }
        }

        // A parent chain longer than the node count means a cycle.
        for node in &self.nodes {
            let mut current = node.parent.as_deref();
            let mut steps = 0;
            while let Some(name) = current {
                steps += 1;
                if steps > self.nodes.len() {
                    errors.push(format!("parent cycle involving node {}", node.name));
                    break;
                }
                current = parents.get(name).copied().flatten();
            }
        }

        errors
    }

    /// Builds a live registry from the document.
    ///
    /// Nodes may reference parents declared later in the document; creation
    /// is deferred until the parent exists.
    pub fn build(&self) -> Result<Registry, SchemeError> {
        let mut registry = Registry::new();

        let mut remaining: Vec<&NodeSpec> = self.nodes.iter().collect();
        while !remaining.is_empty() {
            let mut deferred = Vec::new();
            let mut progressed = false;

            for spec in remaining {
                let parent = match &spec.parent {
                    None => None,
                    Some(name) => match registry.node_id(name) {
                        Ok(id) => Some(id),
                        Err(_) => {
                            deferred.push(spec);
                            continue;
                        }
                    },
                };

                match parent {
                    None => registry.add_root(&spec.name)?,
                    Some(id) => registry.add_child(id, &spec.name)?,
                };
                progressed = true;
            }

            if !progressed {
                let spec = deferred[0];
                return Err(SchemeError::UnknownParent {
                    node: spec.name.clone(),
                    parent: spec.parent.clone().unwrap_or_default(),
                });
            }
            remaining = deferred;
        }

        for spec in &self.nodes {
            let node = registry.node_id(&spec.name)?;
            for declare in &spec.declare {
                let key = SettingKey::try_from(declare.key())?;
                registry.declare_with(node, key, declare.options());
            }
        }

        for spec in &self.nodes {
            let node = registry.node_id(&spec.name)?;
            for (key, value) in &spec.values {
                let key = SettingKey::try_from(key.as_str())?;
                registry.set(node, &key, value.clone())?;
            }
        }

        Ok(registry)
    }
}
