use serde::{Deserialize, Serialize};

/// Options accepted when declaring a setting on a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeclareOptions {
    /// Whether instance-level handles expose a reader for this setting.
    /// The node-level getter and setter are always available.
    pub instance_reader: bool,
}

impl Default for DeclareOptions {
    fn default() -> Self {
        Self {
            instance_reader: true,
        }
    }
}

impl DeclareOptions {
    /// Declaration readable only through the node itself.
    pub fn node_only() -> Self {
        Self {
            instance_reader: false,
        }
    }
}
