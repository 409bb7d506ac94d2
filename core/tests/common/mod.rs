#![allow(dead_code)]

use cascade_core::{NodeId, Registry, SettingKey};

pub fn key(s: &str) -> SettingKey {
    SettingKey::try_from(s).unwrap()
}

/// Parent → Child → Mokopuna, `some_attribute` declared on Parent.
pub fn family_chain() -> (Registry, NodeId, NodeId, NodeId) {
    let mut registry = Registry::new();
    let parent = registry.add_root("Parent").unwrap();
    let child = registry.add_child(parent, "Child").unwrap();
    let mokopuna = registry.add_child(child, "Mokopuna").unwrap();
    registry.declare(parent, key("some_attribute"));
    (registry, parent, child, mokopuna)
}

/// PercysMom → Percy, `superpower` declared on PercysMom.
pub fn percy_pair() -> (Registry, NodeId, NodeId) {
    let mut registry = Registry::new();
    let mom = registry.add_root("PercysMom").unwrap();
    let percy = registry.add_child(mom, "Percy").unwrap();
    registry.declare(mom, key("superpower"));
    (registry, mom, percy)
}
