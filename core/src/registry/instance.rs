use super::{NodeId, Registry, error::RegistryError};
use crate::types::{SettingKey, Value};

/// Read-only view of the registry as seen from a direct instance of a node.
///
/// Instances resolve exactly like their node, but only when the governing
/// declaration exposes an instance reader; otherwise every read fails with
/// [`RegistryError::ReaderNotExposed`]. Instances carry no setter.
pub struct Instance<'a> {
    registry: &'a Registry,
    node: NodeId,
}

impl<'a> Instance<'a> {
    pub(super) fn new(registry: &'a Registry, node: NodeId) -> Self {
        Self { registry, node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn get(&self, key: &SettingKey) -> Result<Option<Value>, RegistryError> {
        self.check_reader(key)?;
        self.registry.get(self.node, key)
    }

    /// Truthiness predicate; suppressed together with the reader.
    pub fn truthy(&self, key: &SettingKey) -> Result<bool, RegistryError> {
        self.check_reader(key)?;
        self.registry.truthy(self.node, key)
    }

    fn check_reader(&self, key: &SettingKey) -> Result<(), RegistryError> {
        let options = self.registry.declaration(self.node, key)?;
        if !options.instance_reader {
            return Err(RegistryError::ReaderNotExposed(key.clone()));
        }
        Ok(())
    }
}
