mod common {
    use crate::registry::{NodeId, Registry};
    use crate::types::SettingKey;

    pub(super) fn make_key(s: &str) -> SettingKey {
        SettingKey::try_from(s).unwrap()
    }

    /// Parent → Child → Mokopuna, `some_attribute` declared on Parent.
    pub(super) fn chain() -> (Registry, NodeId, NodeId, NodeId) {
        let mut registry = Registry::new();
        let parent = registry.add_root("Parent").unwrap();
        let child = registry.add_child(parent, "Child").unwrap();
        let mokopuna = registry.add_child(child, "Mokopuna").unwrap();
        registry.declare(parent, make_key("some_attribute"));
        (registry, parent, child, mokopuna)
    }
}

mod topology {
    use super::common::chain;
    use crate::registry::{Registry, error::RegistryError};

    #[test]
    fn test_add_root_and_child() {
        let mut registry = Registry::new();
        let root = registry.add_root("Root").unwrap();
        let child = registry.add_child(root, "Child").unwrap();

        assert_eq!(registry.name(root), "Root");
        assert_eq!(registry.name(child), "Child");
        assert_eq!(registry.parent(child), Some(root));
        assert_eq!(registry.parent(root), None);
        assert_eq!(registry.children(root), &[child]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_node_names_are_trimmed() {
        let mut registry = Registry::new();
        let root = registry.add_root("  Root  ").unwrap();
        assert_eq!(registry.name(root), "Root");
        assert_eq!(registry.node_id("Root").unwrap(), root);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = Registry::new();
        let root = registry.add_root("Root").unwrap();

        let err = registry.add_root("Root").unwrap_err();
        assert!(matches!(err, RegistryError::NodeExists(_)));

        let err = registry.add_child(root, "Root").unwrap_err();
        assert!(matches!(err, RegistryError::NodeExists(_)));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = Registry::new();
        let err = registry.add_root("   ").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidNodeName(_)));
    }

    #[test]
    fn test_unknown_node_lookup() {
        let registry = Registry::new();
        let err = registry.node_id("Nope").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownNode(_)));
    }

    #[test]
    fn test_ancestry_walks_to_the_root() {
        let (registry, parent, child, mokopuna) = chain();

        let ids: Vec<_> = registry.ancestry(mokopuna).collect();
        assert_eq!(ids, vec![mokopuna, child, parent]);

        let ids: Vec<_> = registry.ancestry(parent).collect();
        assert_eq!(ids, vec![parent]);
    }

    #[test]
    fn test_roots_lists_each_tree_once() {
        let mut registry = Registry::new();
        let a = registry.add_root("A").unwrap();
        let _a1 = registry.add_child(a, "A1").unwrap();
        let b = registry.add_root("B").unwrap();

        assert_eq!(registry.roots(), vec![a, b]);
    }
}

mod declarations {
    use super::common::{chain, make_key};
    use crate::registry::error::RegistryError;
    use crate::types::DeclareOptions;

    #[test]
    fn test_declaration_inherited_by_descendants() {
        let (registry, _parent, child, mokopuna) = chain();
        let key = make_key("some_attribute");

        assert!(registry.is_declared(child, &key));
        assert!(registry.is_declared(mokopuna, &key));
    }

    #[test]
    fn test_declaration_not_visible_above_declaring_node() {
        let (mut registry, parent, child, _mokopuna) = chain();
        let key = make_key("child_only");
        registry.declare(child, key.clone());

        assert!(registry.is_declared(child, &key));
        assert!(!registry.is_declared(parent, &key));
        let err = registry.get(parent, &key).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownSetting(_)));
    }

    #[test]
    fn test_redeclaration_is_not_an_error_and_last_options_win() {
        let (mut registry, parent, _child, _mokopuna) = chain();
        let key = make_key("some_attribute");

        registry.declare_with(parent, key.clone(), DeclareOptions::node_only());
        assert!(!registry.declaration(parent, &key).unwrap().instance_reader);

        registry.declare(parent, key.clone());
        assert!(registry.declaration(parent, &key).unwrap().instance_reader);
    }

    #[test]
    fn test_nearest_declaration_governs() {
        let (mut registry, _parent, child, mokopuna) = chain();
        let key = make_key("some_attribute");

        registry.declare_with(child, key.clone(), DeclareOptions::node_only());

        assert!(!registry.declaration(mokopuna, &key).unwrap().instance_reader);
        assert!(!registry.declaration(child, &key).unwrap().instance_reader);
    }

    #[test]
    fn test_declared_keys_deduplicates_and_sorts() {
        let (mut registry, parent, child, _mokopuna) = chain();
        registry.declare(child, make_key("beta"));
        registry.declare(child, make_key("some_attribute"));
        registry.declare(parent, make_key("alpha"));

        let keys: Vec<String> = registry
            .declared_keys(child)
            .into_iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(keys, vec!["alpha", "beta", "some_attribute"]);
    }

    #[test]
    fn test_unknown_setting_error_carries_the_key() {
        let (registry, parent, _child, _mokopuna) = chain();

        let err = registry.get(parent, &make_key("typo")).unwrap_err();
        match err {
            RegistryError::UnknownSetting(key) => assert_eq!(key.as_str(), "typo"),
            other => panic!("expected UnknownSetting, got {other:?}"),
        }
    }
}

mod resolution {
    use super::common::{chain, make_key};
    use crate::types::Value;

    #[test]
    fn test_unset_everywhere_resolves_absent() {
        let (registry, parent, child, mokopuna) = chain();
        let key = make_key("some_attribute");

        assert_eq!(registry.get(parent, &key).unwrap(), None);
        assert_eq!(registry.get(child, &key).unwrap(), None);
        assert_eq!(registry.get(mokopuna, &key).unwrap(), None);
    }

    #[test]
    fn test_local_entry_wins_over_inherited() {
        let (mut registry, parent, child, _mokopuna) = chain();
        let key = make_key("some_attribute");

        registry.set(parent, &key, "1").unwrap();
        registry.set(child, &key, "2").unwrap();

        assert_eq!(registry.get(parent, &key).unwrap(), Some(Value::from("1")));
        assert_eq!(registry.get(child, &key).unwrap(), Some(Value::from("2")));
    }

    #[test]
    fn test_entry_inherited_through_intermediate_nodes() {
        let (mut registry, parent, _child, mokopuna) = chain();
        let key = make_key("some_attribute");

        registry.set(parent, &key, "1").unwrap();
        assert_eq!(registry.get(mokopuna, &key).unwrap(), Some(Value::from("1")));
    }

    #[test]
    fn test_explicit_nil_terminates_the_walk() {
        let (mut registry, parent, child, mokopuna) = chain();
        let key = make_key("some_attribute");

        registry.set(parent, &key, "1").unwrap();
        registry.set(child, &key, Value::Nil).unwrap();

        assert_eq!(registry.get(child, &key).unwrap(), Some(Value::Nil));
        assert_eq!(registry.get(mokopuna, &key).unwrap(), Some(Value::Nil));
        assert_eq!(registry.get(parent, &key).unwrap(), Some(Value::from("1")));
    }

    #[test]
    fn test_source_of_reports_the_supplying_node() {
        let (mut registry, parent, child, mokopuna) = chain();
        let key = make_key("some_attribute");

        assert_eq!(registry.source_of(mokopuna, &key).unwrap(), None);

        registry.set(parent, &key, "1").unwrap();
        assert_eq!(registry.source_of(mokopuna, &key).unwrap(), Some(parent));

        registry.set(child, &key, "2").unwrap();
        assert_eq!(registry.source_of(mokopuna, &key).unwrap(), Some(child));
        assert_eq!(registry.source_of(parent, &key).unwrap(), Some(parent));
    }

    #[test]
    fn test_truthy_follows_resolution() {
        let (mut registry, parent, child, _mokopuna) = chain();
        let key = make_key("some_attribute");

        assert!(!registry.truthy(child, &key).unwrap());

        registry.set(parent, &key, "HMMM").unwrap();
        assert!(registry.truthy(child, &key).unwrap());

        registry.set(child, &key, false).unwrap();
        assert!(!registry.truthy(child, &key).unwrap());
        assert!(registry.truthy(parent, &key).unwrap());
    }
}

mod writes {
    use super::common::{chain, make_key};
    use crate::registry::error::RegistryError;
    use crate::types::Value;

    #[test]
    fn test_set_on_undeclared_key_fails() {
        let (mut registry, parent, _child, _mokopuna) = chain();

        let err = registry.set(parent, &make_key("typo"), "x").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownSetting(_)));
    }

    #[test]
    fn test_set_overwrites_prior_entry() {
        let (mut registry, parent, _child, _mokopuna) = chain();
        let key = make_key("some_attribute");

        registry.set(parent, &key, "1").unwrap();
        registry.set(parent, &key, Value::Nil).unwrap();

        assert_eq!(registry.get(parent, &key).unwrap(), Some(Value::Nil));
    }

    #[test]
    fn test_set_leaves_ancestors_and_siblings_alone() {
        let (mut registry, parent, child, _mokopuna) = chain();
        let sibling = registry.add_child(parent, "Sibling").unwrap();
        let key = make_key("some_attribute");

        registry.set(child, &key, "2").unwrap();

        assert_eq!(registry.get(parent, &key).unwrap(), None);
        assert_eq!(registry.get(sibling, &key).unwrap(), None);
    }
}

mod instances {
    use super::common::{chain, make_key};
    use crate::registry::error::RegistryError;
    use crate::types::{DeclareOptions, Value};

    #[test]
    fn test_instance_reads_mirror_the_node() {
        let (mut registry, parent, child, _mokopuna) = chain();
        let key = make_key("some_attribute");
        registry.set(parent, &key, "HMMM").unwrap();

        let instance = registry.instance(child);
        assert_eq!(instance.get(&key).unwrap(), Some(Value::from("HMMM")));
        assert!(instance.truthy(&key).unwrap());
    }

    #[test]
    fn test_node_only_declaration_suppresses_instance_reader() {
        let (mut registry, parent, _child, _mokopuna) = chain();
        let key = make_key("no_instance_reader");
        registry.declare_with(parent, key.clone(), DeclareOptions::node_only());
        registry.set(parent, &key, "secret").unwrap();

        let instance = registry.instance(parent);
        let err = instance.get(&key).unwrap_err();
        assert!(matches!(err, RegistryError::ReaderNotExposed(_)));
        let err = instance.truthy(&key).unwrap_err();
        assert!(matches!(err, RegistryError::ReaderNotExposed(_)));

        // Node-level getter and setter are unaffected.
        assert_eq!(registry.get(parent, &key).unwrap(), Some(Value::from("secret")));
    }

    #[test]
    fn test_descendant_redeclaration_governs_its_subtree() {
        let (mut registry, parent, child, mokopuna) = chain();
        let key = make_key("some_attribute");
        registry.declare_with(child, key.clone(), DeclareOptions::node_only());

        assert!(registry.instance(parent).get(&key).is_ok());
        assert!(registry.instance(child).get(&key).is_err());
        assert!(registry.instance(mokopuna).get(&key).is_err());
    }

    #[test]
    fn test_instance_read_of_undeclared_key_fails() {
        let (registry, parent, _child, _mokopuna) = chain();

        let err = registry.instance(parent).get(&make_key("typo")).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownSetting(_)));
    }
}

mod deprecation {
    use super::common::make_key;
    use crate::registry::Registry;
    use crate::types::DeclareOptions;
    use std::sync::{Arc, Mutex};

    fn registry_with_captured_notices() -> (Registry, Arc<Mutex<Vec<String>>>) {
        let notices = Arc::new(Mutex::new(Vec::new()));
        let sink = notices.clone();

        let mut registry = Registry::new();
        registry.set_deprecation_hook(move |message| {
            sink.lock().unwrap().push(message.to_string());
        });
        (registry, notices)
    }

    #[test]
    fn test_legacy_declaration_emits_one_notice_per_call() {
        let (mut registry, notices) = registry_with_captured_notices();
        let node = registry.add_root("Single").unwrap();

        registry.declare_delegating(node, make_key("test_attribute"), DeclareOptions::default());

        let notices = notices.lock().unwrap();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("declare_delegating is deprecated"));
    }

    #[test]
    fn test_each_legacy_call_emits_again() {
        let (mut registry, notices) = registry_with_captured_notices();
        let node = registry.add_root("Single").unwrap();

        registry.declare_delegating(node, make_key("one"), DeclareOptions::default());
        registry.declare_delegating(node, make_key("two"), DeclareOptions::default());

        assert_eq!(notices.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_modern_declaration_is_silent() {
        let (mut registry, notices) = registry_with_captured_notices();
        let node = registry.add_root("Single").unwrap();

        registry.declare(node, make_key("both"));

        assert!(notices.lock().unwrap().is_empty());
    }

    #[test]
    fn test_legacy_declaration_still_declares() {
        let (mut registry, _notices) = registry_with_captured_notices();
        let node = registry.add_root("Single").unwrap();
        let key = make_key("both");

        registry.declare_delegating(node, key.clone(), DeclareOptions::default());

        registry.set(node, &key, "HMMM").unwrap();
        assert!(registry.truthy(node, &key).unwrap());
    }
}
