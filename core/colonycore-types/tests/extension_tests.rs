use colonycore_types::{
    ExtensionContributorContext, ExtensionHookContext, ExtensionSet, ObjectPayload, PayloadError,
    RawExtensions,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn make_set() -> ExtensionSet {
    let hooks = ExtensionHookContext::new();
    let mut plugins = BTreeMap::new();
    plugins.insert("core".to_string(), object(json!({"volume": "5ml", "tags": ["a"]})));
    plugins.insert("external".to_string(), object(json!({"notes": "custom"})));
    let mut raw: RawExtensions = BTreeMap::new();
    raw.insert(hooks.sample_attributes().to_string(), plugins);
    ExtensionSet::new(raw)
}

// ── ExtensionSet ─────────────────────────────────────────────────

#[test]
fn hooks_and_plugins_are_sorted() {
    let hooks = ExtensionHookContext::new();
    let contributors = ExtensionContributorContext::new();
    let set = make_set();

    assert_eq!(set.hooks(), vec![hooks.sample_attributes()]);
    assert_eq!(
        set.plugins(&hooks.sample_attributes()),
        vec![contributors.core(), contributors.custom("external")]
    );
    assert!(set.plugins(&hooks.organism_attributes()).is_empty());
}

#[test]
fn core_payload_is_deep_cloned() {
    let hook = ExtensionHookContext::new().sample_attributes();
    let set = make_set();

    let mut first = set.core(&hook).unwrap().map().unwrap();
    first.insert("volume".into(), json!("10ml"));
    first["tags"].as_array_mut().unwrap().push(json!("b"));

    let fresh = set.core(&hook).unwrap().map().unwrap();
    assert_eq!(fresh["volume"], json!("5ml"));
    assert_eq!(fresh["tags"], json!(["a"]));
}

#[test]
fn core_lookup_for_single_contributor_set() {
    let hook = ExtensionHookContext::new().organism_attributes();
    let set = ExtensionSet::with_core(&hook, object(json!({"temp": 21})));

    let mut first = set.core(&hook).unwrap().map().unwrap();
    first.insert("temp".into(), json!(99));
    first.insert("extra".into(), json!(true));

    assert_eq!(set.core(&hook).unwrap().map().unwrap(), object(json!({"temp": 21})));
}

#[test]
fn missing_lookups_return_none() {
    let hooks = ExtensionHookContext::new();
    let contributors = ExtensionContributorContext::new();
    let set = make_set();

    assert!(set.get(&hooks.sample_attributes(), &contributors.custom("missing")).is_none());
    assert!(set.core(&hooks.observation_data()).is_none());
}

#[test]
fn raw_mutation_does_not_leak() {
    let hook = ExtensionHookContext::new().sample_attributes();
    let set = make_set();

    let mut raw = set.raw();
    raw.get_mut(&hook.to_string())
        .unwrap()
        .get_mut("core")
        .unwrap()
        .insert("volume".into(), json!("mutated"));

    assert_eq!(set.core(&hook).unwrap().map().unwrap()["volume"], json!("5ml"));
}

#[test]
fn empty_hooks_are_dropped() {
    let mut raw: RawExtensions = BTreeMap::new();
    raw.insert("entity.sample.attributes".into(), BTreeMap::new());
    assert!(ExtensionSet::new(raw).is_empty());
}

// ── ObjectPayload ────────────────────────────────────────────────

#[test]
fn object_payload_accepts_objects_and_null() {
    let hook = ExtensionHookContext::new().organism_attributes();

    let payload = ObjectPayload::new(hook.clone(), json!({"color": "green"})).unwrap();
    assert!(payload.defined());
    assert!(!payload.is_empty());
    assert_eq!(payload.hook(), Some(&hook));

    let empty = ObjectPayload::new(hook.clone(), Value::Null).unwrap();
    assert!(empty.defined());
    assert!(empty.is_empty());
    assert_eq!(empty.map(), None);
}

#[test]
fn object_payload_rejects_scalars() {
    let hook = ExtensionHookContext::new().organism_attributes();
    let err = ObjectPayload::new(hook, json!([1, 2])).unwrap_err();
    assert!(matches!(err, PayloadError::NotAnObject { found: "array", .. }));
}

#[test]
fn expect_hook_checks_identity() {
    let hooks = ExtensionHookContext::new();
    let payload = ObjectPayload::new(hooks.sample_attributes(), json!({})).unwrap();

    assert!(payload.expect_hook(&hooks.sample_attributes()).is_ok());
    assert!(matches!(
        payload.expect_hook(&hooks.organism_attributes()),
        Err(PayloadError::HookMismatch { .. })
    ));
    assert!(matches!(
        ObjectPayload::undefined().expect_hook(&hooks.sample_attributes()),
        Err(PayloadError::Undefined(_))
    ));
}

#[test]
fn object_payload_serializes_as_map_or_null() {
    let hook = ExtensionHookContext::new().organism_attributes();
    let payload = ObjectPayload::new(hook, json!({"a": 1})).unwrap();

    assert_eq!(serde_json::to_value(&payload).unwrap(), json!({"a": 1}));
    assert_eq!(serde_json::to_value(ObjectPayload::undefined()).unwrap(), Value::Null);
}
