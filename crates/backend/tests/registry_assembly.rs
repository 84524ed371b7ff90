//! Property tests for registry assembly and the runtime key-set contract

use std::collections::BTreeSet;
use std::sync::Arc;

use keystone_backend::registry::SharedDescriptor;
use keystone_backend::{
    Descriptor, Error, RealizedRegistry, RealizedResource, Registry, ResourceKey, ResourceKind,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Marker(u8);

impl Descriptor for Marker {
    type Realized = u8;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Custom("marker")
    }
}

fn shared(n: u8) -> Option<SharedDescriptor> {
    Some(Arc::new(Marker(n)))
}

/// Valid resource keys
fn arb_key() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_]{0,12}"
}

proptest! {
    /// The registry's key set equals the input key set, in input order.
    #[test]
    fn key_set_is_preserved(keys in prop::collection::btree_set(arb_key(), 0..16)) {
        let pairs: Vec<(String, Option<SharedDescriptor>)> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), shared(i as u8)))
            .collect();
        let registry = Registry::assemble(pairs.clone()).unwrap();

        let got: Vec<&str> = registry.keys().map(ResourceKey::as_str).collect();
        let expected: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        prop_assert_eq!(got, expected);
        prop_assert_eq!(registry.len(), keys.len());
    }

    /// A repeated name fails with DuplicateName wherever the repeat sits.
    #[test]
    fn duplicates_fail_in_any_order(
        keys in prop::collection::btree_set(arb_key(), 1..10),
        pick in any::<prop::sample::Index>(),
        at in any::<prop::sample::Index>(),
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let repeated = pick.get(&keys).clone();
        let mut names = keys.clone();
        names.insert(at.index(names.len() + 1), repeated.clone());

        let pairs = names.into_iter().map(|k| (k, shared(0)));
        match Registry::assemble(pairs) {
            Err(Error::DuplicateName { key }) => prop_assert_eq!(key, repeated),
            other => prop_assert!(false, "expected DuplicateName, got {:?}", other.map(|r| r.len())),
        }
    }

    /// A repeated name is reported even when one of its copies is absent.
    #[test]
    fn duplicates_win_over_absent_descriptors(
        keys in prop::collection::btree_set(arb_key(), 1..10),
        pick in any::<prop::sample::Index>(),
        at in any::<prop::sample::Index>(),
        absent_first in any::<bool>(),
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let repeated = pick.get(&keys).clone();
        let mut names = keys.clone();
        names.insert(at.index(names.len() + 1), repeated.clone());

        let mut seen = 0;
        let pairs = names.into_iter().map(|k| {
            if k != repeated {
                return (k, shared(0));
            }
            seen += 1;
            let absent = (seen == 1) == absent_first;
            (k, if absent { None } else { shared(0) })
        });
        match Registry::assemble(pairs) {
            Err(Error::DuplicateName { key }) => prop_assert_eq!(key, repeated),
            other => prop_assert!(false, "expected DuplicateName, got {:?}", other.map(|r| r.len())),
        }
    }

    /// Any key outside the registry fails every realized access.
    #[test]
    fn unknown_keys_fail_every_access(
        keys in prop::collection::btree_set(arb_key(), 1..8),
        probe in arb_key(),
    ) {
        prop_assume!(!keys.contains(&probe));
        let entries = keys.iter().map(|k| {
            let resource = RealizedResource::new(ResourceKind::Custom("marker"), 0_u8);
            (ResourceKey::new(k.as_str()).unwrap(), resource)
        });
        let mut realized = RealizedRegistry::from_entries(entries).unwrap();

        let is_unknown =
            |e: &Error| matches!(e, Error::UnknownResourceKey { key, .. } if *key == probe);
        prop_assert!(is_unknown(&realized.resource(&probe).unwrap_err()));
        prop_assert!(is_unknown(&realized.get::<u8>(&probe).unwrap_err()));
        prop_assert!(is_unknown(&realized.get_mut::<u8>(&probe).unwrap_err()));

        let available: BTreeSet<&str> = realized.keys().map(ResourceKey::as_str).collect();
        let expected: BTreeSet<&str> = keys.iter().map(String::as_str).collect();
        prop_assert_eq!(available, expected);
    }
}

#[test]
fn a_b_c_exposes_exactly_a_b_c() {
    let registry = Registry::builder()
        .with("a", Marker(1))
        .with("b", Marker(2))
        .with("c", Marker(3))
        .build()
        .unwrap();

    let keys: Vec<&str> = registry.keys().map(ResourceKey::as_str).collect();
    assert_eq!(keys, ["a", "b", "c"]);
    assert_eq!(registry.get_as::<Marker>("b").unwrap().0, 2);

    let err = registry.get_as::<Marker>("d").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown resource key 'd' (available: a, b, c)"
    );
}
