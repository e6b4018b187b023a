//! Trap behaviour of mapping proxies as seen from the host

mod common;

use common::{Fixture, bridge_error, key};
use otter_dict_proxy::{BridgeConfig, BridgeError, DescriptorPolicy, SymbolKeyPolicy};
use otter_foreign::{DictRef, ForeignError, ForeignKey, ForeignValue};
use otter_host::{HostConfig, PropertyAttributes, PropertyDescriptor, PropertyKey, Value};

#[test]
fn test_basic_scenario() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();

    assert!(cx.own_keys(proxy).unwrap().is_empty());
    assert!(cx.set(proxy, &key("a"), Value::int32(1)).unwrap());
    assert!(cx.set(proxy, &key("b"), Value::string("x")).unwrap());

    assert_eq!(cx.own_keys(proxy).unwrap(), vec![key("a"), key("b")]);
    assert_eq!(cx.get(proxy, &key("a")).unwrap(), Value::int32(1));
    assert!(cx.has(proxy, &key("a")).unwrap());
    assert!(cx.has_own(proxy, &key("a")).unwrap());
    assert!(!cx.has(proxy, &key("c")).unwrap());
    assert!(cx.delete(proxy, &key("a")).unwrap());
    assert_eq!(cx.own_keys(proxy).unwrap(), vec![key("b")]);

    assert_eq!(dict.keys(), vec![ForeignKey::str("b")]);
    assert_eq!(dict.get_item(&ForeignKey::str("b")), Some(ForeignValue::str("x")));
}

#[test]
fn test_absent_keys_read_as_undefined() {
    let Fixture { mut cx, proxy, .. } = Fixture::new();

    assert_eq!(cx.get(proxy, &key("missing")).unwrap(), Value::Undefined);
    assert!(!cx.has(proxy, &key("missing")).unwrap());
    assert!(!cx.has_own(proxy, &key("missing")).unwrap());
}

#[test]
fn test_delete_then_has_and_delete_absent() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();
    dict.set_item(ForeignKey::str("k"), ForeignValue::Int(1))
        .unwrap();

    assert!(cx.delete(proxy, &key("k")).unwrap());
    assert!(!cx.has(proxy, &key("k")).unwrap());

    let err = cx.delete(proxy, &key("k")).unwrap_err();
    match bridge_error(&err) {
        BridgeError::StoreMutation { op, key, source } => {
            assert_eq!(*op, "delete");
            assert_eq!(key, "'k'");
            assert!(matches!(source, ForeignError::KeyError(_)));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_index_and_string_identifiers_share_a_key() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();

    cx.set(proxy, &PropertyKey::Index(0), Value::string("zero"))
        .unwrap();
    assert_eq!(dict.keys(), vec![ForeignKey::str("0")]);
    assert_eq!(
        cx.get_computed(proxy, &Value::string("0")).unwrap(),
        Value::string("zero")
    );
    assert_eq!(cx.own_keys(proxy).unwrap(), vec![PropertyKey::Index(0)]);
}

#[test]
fn test_enumeration_traps_agree() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();
    for name in ["z", "y", "x"] {
        dict.set_item(ForeignKey::str(name), ForeignValue::None)
            .unwrap();
    }

    let own = cx.own_keys(proxy).unwrap();
    assert_eq!(own, vec![key("z"), key("y"), key("x")]);
    assert_eq!(cx.keys(proxy).unwrap(), own);
    assert_eq!(cx.enumerate(proxy).unwrap(), own);
}

#[test]
fn test_foreign_mutation_is_visible_immediately() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();

    assert_eq!(cx.get(proxy, &key("late")).unwrap(), Value::Undefined);
    dict.set_item(ForeignKey::str("late"), ForeignValue::Bool(true))
        .unwrap();
    assert_eq!(cx.get(proxy, &key("late")).unwrap(), Value::Boolean(true));

    dict.del_item(&ForeignKey::str("late")).unwrap();
    assert!(!cx.has(proxy, &key("late")).unwrap());
}

#[test]
fn test_non_string_foreign_keys_are_not_enumerated() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();
    dict.set_item(ForeignKey::Int(1), ForeignValue::str("int key"))
        .unwrap();
    dict.set_item(ForeignKey::None, ForeignValue::str("none key"))
        .unwrap();
    dict.set_item(ForeignKey::str("s"), ForeignValue::str("str key"))
        .unwrap();

    assert_eq!(cx.own_keys(proxy).unwrap(), vec![key("s")]);
    // 1 and "1" are different foreign keys
    assert!(!cx.has(proxy, &PropertyKey::Index(1)).unwrap());
    assert_eq!(cx.get(proxy, &PropertyKey::Index(1)).unwrap(), Value::Undefined);
}

#[test]
fn test_value_conversion_through_traps() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();

    cx.set(proxy, &key("u"), Value::Undefined).unwrap();
    cx.set(proxy, &key("n"), Value::Null).unwrap();
    assert_eq!(dict.get_item(&ForeignKey::str("u")), Some(ForeignValue::None));
    assert_eq!(dict.get_item(&ForeignKey::str("n")), Some(ForeignValue::Null));
    assert_eq!(cx.get(proxy, &key("u")).unwrap(), Value::Undefined);
    assert_eq!(cx.get(proxy, &key("n")).unwrap(), Value::Null);
    assert!(cx.has(proxy, &key("u")).unwrap());

    dict.set_item(ForeignKey::str("big"), ForeignValue::Int(1 << 60))
        .unwrap();
    let err = cx.get(proxy, &key("big")).unwrap_err();
    assert!(matches!(bridge_error(&err), BridgeError::Conversion(_)));

    let symbol = cx.new_symbol();
    let err = cx.set(proxy, &key("sym"), symbol).unwrap_err();
    assert!(matches!(bridge_error(&err), BridgeError::Conversion(_)));
    assert!(!dict.contains_key(&ForeignKey::str("sym")));
}

#[test]
fn test_ordinary_objects_are_stored_as_new_mappings() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();
    let obj = cx.new_object();
    cx.set(obj, &key("inner"), Value::int32(5)).unwrap();

    cx.set(proxy, &key("obj"), Value::Object(obj)).unwrap();

    let stored = dict.get_item(&ForeignKey::str("obj")).unwrap();
    let stored = stored.as_dict().unwrap();
    assert_eq!(
        stored.get_item(&ForeignKey::str("inner")),
        Some(ForeignValue::Float(5.0))
    );
}

#[test]
fn test_cyclic_objects_are_not_stored() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();
    let obj = cx.new_object();
    cx.set(obj, &key("me"), Value::Object(obj)).unwrap();

    let err = cx.set(proxy, &key("loop"), Value::Object(obj)).unwrap_err();
    assert!(matches!(bridge_error(&err), BridgeError::Conversion(_)));
    assert!(dict.is_empty());
    assert_eq!(dict.refcount(), 2);
}

#[test]
fn test_nested_mapping_is_a_live_proxy() {
    let Fixture {
        mut cx,
        bridge,
        dict,
        proxy,
    } = Fixture::new();
    let inner = DictRef::new();
    dict.set_item(ForeignKey::str("inner"), ForeignValue::Dict(inner.clone()))
        .unwrap();

    let value = cx.get(proxy, &key("inner")).unwrap();
    let nested = value.as_object().unwrap();
    assert!(bridge.unwrap(&cx, nested).unwrap().ptr_eq(&inner));

    cx.set(nested, &key("deep"), Value::boolean(true)).unwrap();
    assert_eq!(
        inner.get_item(&ForeignKey::str("deep")),
        Some(ForeignValue::Bool(true))
    );

    // Storing the proxy back stores the mapping itself, not a copy
    cx.set(proxy, &key("again"), value).unwrap();
    let again = dict.get_item(&ForeignKey::str("again")).unwrap();
    assert!(again.as_dict().unwrap().ptr_eq(&inner));
}

#[test]
fn test_define_property_policy() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();

    assert!(
        cx.define_property(proxy, &key("v"), &PropertyDescriptor::data(Value::int32(2)))
            .unwrap()
    );
    assert_eq!(dict.get_item(&ForeignKey::str("v")), Some(ForeignValue::Float(2.0)));

    // Generic descriptor: new key stores None, existing key is untouched
    assert!(
        cx.define_property(proxy, &key("g"), &PropertyDescriptor::default())
            .unwrap()
    );
    assert_eq!(dict.get_item(&ForeignKey::str("g")), Some(ForeignValue::None));
    assert!(
        cx.define_property(proxy, &key("v"), &PropertyDescriptor::default())
            .unwrap()
    );
    assert_eq!(dict.get_item(&ForeignKey::str("v")), Some(ForeignValue::Float(2.0)));

    let accessor = PropertyDescriptor::accessor(Some(Value::Undefined), None);
    let err = cx.define_property(proxy, &key("acc"), &accessor).unwrap_err();
    assert!(matches!(bridge_error(&err), BridgeError::Conversion(_)));
    assert!(!dict.contains_key(&ForeignKey::str("acc")));

    let frozen = PropertyDescriptor::data_with_attrs(Value::int32(3), PropertyAttributes::frozen());
    let err = cx.define_property(proxy, &key("f"), &frozen).unwrap_err();
    assert!(matches!(bridge_error(&err), BridgeError::Conversion(_)));
    assert!(!dict.contains_key(&ForeignKey::str("f")));
}

#[test]
fn test_lenient_descriptors_store_the_value() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::with(
        HostConfig::default(),
        BridgeConfig::new().descriptors(DescriptorPolicy::Lenient),
    );

    let frozen = PropertyDescriptor::data_with_attrs(Value::int32(3), PropertyAttributes::frozen());
    assert!(cx.define_property(proxy, &key("f"), &frozen).unwrap());
    assert_eq!(dict.get_item(&ForeignKey::str("f")), Some(ForeignValue::Float(3.0)));

    // Attributes are not remembered: the key stays writable
    assert!(cx.set(proxy, &key("f"), Value::int32(4)).unwrap());

    let accessor = PropertyDescriptor::accessor(None, Some(Value::Undefined));
    assert!(cx.define_property(proxy, &key("acc"), &accessor).is_err());
}

#[test]
fn test_prevent_extensions_is_host_side_only() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();
    cx.set(proxy, &key("old"), Value::int32(1)).unwrap();

    assert!(cx.is_extensible(proxy).unwrap());
    assert!(cx.prevent_extensions(proxy).unwrap());
    assert!(!cx.is_extensible(proxy).unwrap());

    // New keys are refused; strict mode raises
    let err = cx.set(proxy, &key("new"), Value::int32(2)).unwrap_err();
    assert!(err.is_type_error());
    let err = cx
        .define_property(proxy, &key("new"), &PropertyDescriptor::value_only(Value::Null))
        .unwrap_err();
    assert!(err.is_type_error());
    assert!(!dict.contains_key(&ForeignKey::str("new")));

    // Existing keys still update and delete
    assert!(cx.set(proxy, &key("old"), Value::int32(3)).unwrap());
    assert_eq!(cx.get(proxy, &key("old")).unwrap(), Value::int32(3));
    assert!(cx.delete(proxy, &key("old")).unwrap());

    // The mapping itself is unaffected
    dict.set_item(ForeignKey::str("foreign"), ForeignValue::Int(1))
        .unwrap();
    assert!(cx.has(proxy, &key("foreign")).unwrap());
}

#[test]
fn test_non_extensible_refusal_in_sloppy_mode() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::with(HostConfig::sloppy(), BridgeConfig::default());

    cx.prevent_extensions(proxy).unwrap();
    assert!(!cx.set(proxy, &key("new"), Value::int32(1)).unwrap());
    assert!(dict.is_empty());
}

#[test]
fn test_prototype_is_object_prototype() {
    let Fixture { mut cx, proxy, .. } = Fixture::new();
    let expected = cx.object_prototype();
    assert_eq!(cx.get_prototype_of(proxy).unwrap(), Some(expected));
}

#[test]
fn test_proxy_serves_as_prototype() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();
    dict.set_item(ForeignKey::str("shared"), ForeignValue::Int(9))
        .unwrap();

    let child = cx.new_object_with_proto(Some(proxy));
    assert_eq!(cx.get(child, &key("shared")).unwrap(), Value::int32(9));
    assert!(cx.has(child, &key("shared")).unwrap());
    assert_eq!(cx.enumerate(child).unwrap(), vec![key("shared")]);

    // Assignment through the child writes the mapping
    assert!(cx.set(child, &key("x"), Value::int32(1)).unwrap());
    assert_eq!(dict.get_item(&ForeignKey::str("x")), Some(ForeignValue::Float(1.0)));
    assert!(!cx.has_own(child, &key("x")).unwrap());
}

#[test]
fn test_symbol_keys_rejected_by_default() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();
    let symbol = cx.new_symbol();
    let sym = cx.to_property_key(&symbol).unwrap();

    for result in [
        cx.get(proxy, &sym).map(|_| ()),
        cx.has(proxy, &sym).map(|_| ()),
        cx.set(proxy, &sym, Value::Null).map(|_| ()),
        cx.delete(proxy, &sym).map(|_| ()),
        cx.get(proxy, &PropertyKey::Void).map(|_| ()),
    ] {
        let err = result.unwrap_err();
        assert!(matches!(
            bridge_error(&err),
            BridgeError::UnsupportedIdentifier
        ));
    }
    assert!(dict.is_empty());
}

#[test]
fn test_symbol_keys_treated_as_absent() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::with(
        HostConfig::sloppy(),
        BridgeConfig::new().symbol_keys(SymbolKeyPolicy::TreatAsAbsent),
    );
    let symbol = cx.new_symbol();
    let sym = cx.to_property_key(&symbol).unwrap();

    assert_eq!(cx.get(proxy, &sym).unwrap(), Value::Undefined);
    assert!(!cx.has(proxy, &sym).unwrap());
    assert!(!cx.has_own(proxy, &sym).unwrap());
    assert!(!cx.set(proxy, &sym, Value::Null).unwrap());
    assert!(!cx.delete(proxy, &sym).unwrap());
    assert!(
        !cx.define_property(proxy, &sym, &PropertyDescriptor::value_only(Value::Null))
            .unwrap()
    );
    assert!(dict.is_empty());
}

#[test]
fn test_frozen_mapping_rejects_writes() {
    let Fixture {
        mut cx,
        dict,
        proxy,
        ..
    } = Fixture::new();
    dict.set_item(ForeignKey::str("k"), ForeignValue::Int(1))
        .unwrap();
    dict.freeze();

    assert_eq!(cx.get(proxy, &key("k")).unwrap(), Value::int32(1));

    for err in [
        cx.set(proxy, &key("k"), Value::int32(2)).unwrap_err(),
        cx.delete(proxy, &key("k")).unwrap_err(),
        cx.define_property(proxy, &key("k"), &PropertyDescriptor::value_only(Value::Null))
            .unwrap_err(),
    ] {
        match bridge_error(&err) {
            BridgeError::StoreMutation { source, .. } => {
                assert!(matches!(source, ForeignError::TypeError(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!(dict.get_item(&ForeignKey::str("k")), Some(ForeignValue::Int(1)));
}

#[test]
fn test_unwrap_rejects_other_objects() {
    let Fixture { mut cx, bridge, .. } = Fixture::new();
    let obj = cx.new_object();
    assert!(bridge.unwrap(&cx, obj).is_none());
}
