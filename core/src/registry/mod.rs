//! Node forest and setting resolution.
//!
//! A [`Registry`] owns every node. Settings are declared on a node and become
//! resolvable on that node and all of its present and future descendants.
//! Reading walks the chain node → parent → … → root and returns the first
//! explicit entry; writing stores an entry on exactly one node, so
//! descendants without their own entry observe the new value while overridden
//! subtrees stay insulated.

use crate::types::{DeclareOptions, SettingKey, Value};
use error::RegistryError;
use std::collections::HashMap;

mod instance;
pub use instance::Instance;

pub mod error {
    use crate::types::SettingKey;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum RegistryError {
        #[error("unknown setting: {0}")]
        UnknownSetting(SettingKey),

        #[error("unknown node: {0}")]
        UnknownNode(String),

        #[error("node already exists: {0}")]
        NodeExists(String),

        #[error("invalid node name: {0:?}")]
        InvalidNodeName(String),

        #[error("reader not exposed on instances: {0}")]
        ReaderNotExposed(SettingKey),
    }
}

/// Handle to a node in a registry's forest.
///
/// Handles are only meaningful for the registry that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

#[derive(Debug)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Keys declared directly on this node.
    declarations: HashMap<SettingKey, DeclareOptions>,
    /// Explicit entries stored directly on this node. Absent = defer to parent.
    entries: HashMap<SettingKey, Value>,
}

type DeprecationHook = Box<dyn Fn(&str) + Send + Sync>;

/// The forest of nodes and their settings.
pub struct Registry {
    nodes: Vec<Node>,
    by_name: HashMap<String, NodeId>,
    deprecation_hook: Option<DeprecationHook>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("nodes", &self.nodes)
            .field("by_name", &self.by_name)
            .field(
                "deprecation_hook",
                &self.deprecation_hook.as_ref().map(|_| "<hook>"),
            )
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            by_name: HashMap::new(),
            deprecation_hook: None,
        }
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    fn insert_node(
        &mut self,
        name: &str,
        parent: Option<NodeId>,
    ) -> Result<NodeId, RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::InvalidNodeName(name.to_string()));
        }
        if self.by_name.contains_key(name) {
            return Err(RegistryError::NodeExists(name.to_string()));
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            declarations: HashMap::new(),
            entries: HashMap::new(),
        });
        self.by_name.insert(name.to_string(), id);

        if let Some(parent) = parent {
            self.node_mut(parent).children.push(id);
        }
        Ok(id)
    }
}

/// Topology operations.
impl Registry {
    /// Adds a new root node. Names are unique across the whole forest.
    pub fn add_root(&mut self, name: &str) -> Result<NodeId, RegistryError> {
        self.insert_node(name, None)
    }

    /// Adds a child of an existing node.
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> Result<NodeId, RegistryError> {
        self.insert_node(name, Some(parent))
    }

    pub fn node_id(&self, name: &str) -> Result<NodeId, RegistryError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::UnknownNode(name.to_string()))
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Root nodes in creation order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.node_ids()
            .filter(|id| self.node(*id).parent.is_none())
            .collect()
    }

    /// All nodes in creation order. Parents always precede their children.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The resolution chain: the node itself, then each ancestor up to the
    /// root.
    pub fn ancestry(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = Some(id);
        std::iter::from_fn(move || {
            let id = current?;
            current = self.node(id).parent;
            Some(id)
        })
    }
}

/// Declaration operations.
impl Registry {
    /// Declares `key` on `node` with default options.
    pub fn declare(&mut self, node: NodeId, key: SettingKey) {
        self.declare_with(node, key, DeclareOptions::default());
    }

    /// Declares `key` on `node`, making it resolvable on the node and all of
    /// its present and future descendants.
    ///
    /// Redeclaring a key on the same node is not an error; the last options
    /// win.
    pub fn declare_with(&mut self, node: NodeId, key: SettingKey, options: DeclareOptions) {
        self.node_mut(node).declarations.insert(key, options);
    }

    /// Compatibility entry point for callers migrating from the delegating
    /// accessor API. Emits one deprecation notice per call, then behaves
    /// exactly like [`Registry::declare_with`].
    pub fn declare_delegating(&mut self, node: NodeId, key: SettingKey, options: DeclareOptions) {
        self.deprecation_notice("declare_delegating is deprecated, use declare instead");
        self.declare_with(node, key, options);
    }

    /// Installs the channel used for deprecation notices. Without a hook the
    /// notice goes to `tracing::warn!`.
    pub fn set_deprecation_hook(&mut self, hook: impl Fn(&str) + Send + Sync + 'static) {
        self.deprecation_hook = Some(Box::new(hook));
    }

    fn deprecation_notice(&self, message: &str) {
        match &self.deprecation_hook {
            Some(hook) => hook(message),
            None => tracing::warn!("{message}"),
        }
    }

    /// The declaration governing `key` at `node`: the nearest one on the
    /// chain toward the root.
    pub fn declaration(&self, node: NodeId, key: &SettingKey) -> Result<DeclareOptions, RegistryError> {
        for id in self.ancestry(node) {
            if let Some(options) = self.node(id).declarations.get(key) {
                return Ok(*options);
            }
        }
        Err(RegistryError::UnknownSetting(key.clone()))
    }

    pub fn is_declared(&self, node: NodeId, key: &SettingKey) -> bool {
        self.declaration(node, key).is_ok()
    }

    /// Every key resolvable at `node` (own declarations plus inherited),
    /// deduplicated and sorted.
    pub fn declared_keys(&self, node: NodeId) -> Vec<SettingKey> {
        let mut keys: Vec<SettingKey> = Vec::new();
        for id in self.ancestry(node) {
            for key in self.node(id).declarations.keys() {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }
        keys.sort();
        keys
    }

    /// Keys declared directly on `node`, with their options.
    pub fn own_declarations(
        &self,
        node: NodeId,
    ) -> impl Iterator<Item = (&SettingKey, DeclareOptions)> + '_ {
        self.node(node)
            .declarations
            .iter()
            .map(|(key, options)| (key, *options))
    }
}

/// Read operations.
impl Registry {
    /// Resolves `key` at `node` by walking the chain toward the root.
    ///
    /// Returns the first explicit entry found; an explicit [`Value::Nil`] or
    /// `false` terminates the walk like any other value. `Ok(None)` means no
    /// node on the chain holds an entry.
    pub fn get(&self, node: NodeId, key: &SettingKey) -> Result<Option<Value>, RegistryError> {
        Ok(self.resolve(node, key)?.map(|(_, value)| value.clone()))
    }

    /// Whether `key` resolves to a non-nil, non-false value at `node`.
    /// The absent sentinel resolves falsy.
    pub fn truthy(&self, node: NodeId, key: &SettingKey) -> Result<bool, RegistryError> {
        Ok(self.get(node, key)?.is_some_and(|value| value.is_truthy()))
    }

    /// The node whose explicit entry supplies the resolved value, if any.
    pub fn source_of(&self, node: NodeId, key: &SettingKey) -> Result<Option<NodeId>, RegistryError> {
        Ok(self.resolve(node, key)?.map(|(id, _)| id))
    }

    /// Explicit entries stored directly on `node`.
    pub fn own_entries(&self, node: NodeId) -> impl Iterator<Item = (&SettingKey, &Value)> + '_ {
        self.node(node).entries.iter()
    }

    fn resolve(
        &self,
        node: NodeId,
        key: &SettingKey,
    ) -> Result<Option<(NodeId, &Value)>, RegistryError> {
        self.declaration(node, key)?;

        for id in self.ancestry(node) {
            if let Some(value) = self.node(id).entries.get(key) {
                return Ok(Some((id, value)));
            }
        }
        Ok(None)
    }
}

/// Write operations.
impl Registry {
    /// Stores `value` as the explicit entry for `key` on `node` only.
    ///
    /// Descendants without their own entry observe the new value on their
    /// next read; descendants with one are unaffected, as are ancestors and
    /// siblings. Always overwrites any prior entry on the node.
    pub fn set(
        &mut self,
        node: NodeId,
        key: &SettingKey,
        value: impl Into<Value>,
    ) -> Result<(), RegistryError> {
        self.declaration(node, key)?;
        self.node_mut(node).entries.insert(key.clone(), value.into());
        Ok(())
    }
}

/// Instance surface.
impl Registry {
    /// A read-only view modeling a direct instance of `node`.
    pub fn instance(&self, node: NodeId) -> Instance<'_> {
        Instance::new(self, node)
    }
}

#[cfg(test)]
mod tests;
