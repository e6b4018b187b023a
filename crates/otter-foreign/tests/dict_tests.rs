//! Mapping behaviour visible to foreign code

use std::sync::Arc;
use std::thread;

use otter_foreign::{DictRef, ForeignKey, ForeignValue};

#[test]
fn test_mixed_key_types_are_distinct() {
    let dict = DictRef::new();
    dict.set_item(ForeignKey::Int(1), ForeignValue::str("int"))
        .unwrap();
    dict.set_item(ForeignKey::str("1"), ForeignValue::str("str"))
        .unwrap();
    dict.set_item(ForeignKey::None, ForeignValue::str("none"))
        .unwrap();

    assert_eq!(dict.len(), 3);
    assert_eq!(
        dict.get_item(&ForeignKey::Int(1)),
        Some(ForeignValue::str("int"))
    );
    assert_eq!(
        dict.get_item(&ForeignKey::str("1")),
        Some(ForeignValue::str("str"))
    );
}

#[test]
fn test_self_containing_mapping() {
    let dict = DictRef::new();
    dict.set_item("self".into(), ForeignValue::Dict(dict.clone()))
        .unwrap();

    let inner = dict.get_item(&"self".into()).unwrap();
    assert!(inner.as_dict().unwrap().ptr_eq(&dict));
    assert!(format!("{:?}", dict).contains("len: 1"));

    // Break the cycle so the mapping is released
    dict.clear().unwrap();
    drop(inner);
    assert_eq!(dict.refcount(), 1);
}

#[test]
fn test_writers_serialize_under_interpreter_lock() {
    let dict = Arc::new(DictRef::new());
    let workers: Vec<_> = (0..4i64)
        .map(|w| {
            let dict = Arc::clone(&dict);
            thread::spawn(move || {
                for i in 0..100i64 {
                    let _gil = otter_foreign::lock();
                    dict.set_item(ForeignKey::Int(w * 100 + i), ForeignValue::Int(i))
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(dict.len(), 400);
}
