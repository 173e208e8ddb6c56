//! Integration Tests for Observation
//!
//! These tests drive observed records and sequences through watchers the
//! way a rendering layer would.

use std::sync::Arc;

use ripple_core::observer::{delete, observe, set};
use ripple_core::reactive::Watcher;
use ripple_core::value::{Record, Sequence, Value};
use serde_json::json;

/// A watcher that reads `key` from `record` on every run.
fn reads(record: &Record, key: &'static str) -> Arc<Watcher> {
    let record = record.clone();
    Watcher::new(move || {
        let _ = record.get(key);
    })
}

fn observed(json: serde_json::Value) -> Record {
    let value = Value::from(json);
    observe(&value, false).expect("records are observable");
    value.as_record().cloned().expect("json object")
}

/// Observing twice returns the same observer.
#[test]
fn observation_is_idempotent() {
    let value = Value::from(json!({ "a": 1, "list": [1, 2] }));

    let first = observe(&value, false).unwrap();
    let second = observe(&value, false).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let list = value.as_record().unwrap().get("list").unwrap();
    let list_first = list.observer().unwrap();
    assert!(Arc::ptr_eq(&list_first, &observe(&list, false).unwrap()));
}

/// A read while active captures the dependency; a changing write re-runs
/// the subscriber exactly once, an identical write never.
#[test]
fn reads_capture_dependencies() {
    let state = observed(json!({ "p": 1 }));
    let watcher = reads(&state, "p");
    assert_eq!(watcher.run_count(), 1);

    state.assign("p", 2);
    assert_eq!(watcher.run_count(), 2);

    state.assign("p", 2);
    assert_eq!(watcher.run_count(), 2);
}

/// Reading a property holding a sequence depends on the sequence itself.
#[test]
fn nested_sequence_mutation_reruns_reader() {
    let state = observed(json!({ "items": [1, 2] }));
    let watcher = reads(&state, "items");

    let items = state.get_untracked("items").unwrap();
    items.as_sequence().unwrap().push(3);

    assert_eq!(watcher.run_count(), 2);
    assert_eq!(items.as_sequence().unwrap().len(), 3);
}

/// Mutating a record inside a sequence re-runs readers of its property,
/// and reading the sequence also depends on the record's shape.
#[test]
fn sequence_elements_are_tracked_through_parent() {
    let state = observed(json!({ "rows": [{ "id": 1 }] }));
    let watcher = reads(&state, "rows");

    let rows = state.get_untracked("rows").unwrap();
    let row = rows.as_sequence().unwrap().get(0).unwrap();
    set(&row, "label", "first");

    assert_eq!(watcher.run_count(), 2);
}

/// NaN written over NaN is not a change.
#[test]
fn nan_write_is_noop() {
    let state = Record::from_iter([("n", f64::NAN)]);
    observe(&Value::from(&state), false);
    let watcher = reads(&state, "n");

    state.assign("n", f64::NAN);
    set(&state, "n", f64::NAN);
    assert_eq!(watcher.run_count(), 1);
}

/// Keys added with `set` are reactive; keys added by assignment are not.
#[test]
fn dynamic_keys_need_the_mutation_api() {
    let state = observed(json!({ "a": 1 }));

    set(&state, "b", 1);
    let b_reader = reads(&state, "b");
    state.assign("b", 2);
    assert_eq!(b_reader.run_count(), 2);

    state.assign("c", 1);
    assert!(!state.is_reactive("c"));
    let c_reader = reads(&state, "c");
    state.assign("c", 2);
    assert_eq!(c_reader.run_count(), 1);
    assert_eq!(state.get("c"), Some(Value::from(2)));
}

/// Positional writes through `set` notify; raw index writes do not.
#[test]
fn sequence_index_mutation() {
    let state = observed(json!({ "seq": [1, 2, 3] }));
    let watcher = reads(&state, "seq");
    let seq: Sequence = state
        .get_untracked("seq")
        .and_then(|v| v.as_sequence().cloned())
        .unwrap();

    set(&seq, 1, 99);
    assert_eq!(seq.get(1), Some(Value::from(99)));
    assert_eq!(watcher.run_count(), 2);

    seq.assign(1, 100);
    assert_eq!(seq.get(1), Some(Value::from(100)));
    assert_eq!(watcher.run_count(), 2);
}

/// Deleting a present key notifies; deleting an absent one does not.
#[test]
fn deletion_notifies_shape_dependents() {
    let state = observed(json!({ "obj": { "a": 1 } }));
    let watcher = reads(&state, "obj");
    let obj = state.get_untracked("obj").unwrap();

    delete(&obj, "a");
    assert!(!obj.as_record().unwrap().contains_key("a"));
    assert_eq!(watcher.run_count(), 2);

    delete(&obj, "a");
    assert_eq!(watcher.run_count(), 2);
}

/// Replacing a nested container moves the dependency to the new one.
#[test]
fn replaced_child_is_observed() {
    let state = observed(json!({ "list": [1] }));
    let watcher = reads(&state, "list");

    let fresh = Sequence::from_iter([5, 6]);
    state.assign("list", &fresh);
    assert_eq!(watcher.run_count(), 2);
    assert!(fresh.observer().is_some());

    fresh.pop();
    assert_eq!(watcher.run_count(), 3);
}

/// End to end: two watchers on two keys only re-run for their own key.
#[test]
fn end_to_end_counter() {
    let obj = Record::from_iter([("count", 0)]);
    observe(&Value::from(&obj), false);

    let s1 = reads(&obj, "count");
    set(&obj, "count", 1);
    assert_eq!(s1.run_count() - 1, 1);

    set(&obj, "extra", 5);
    let s2 = reads(&obj, "extra");
    obj.assign("extra", 6);

    assert_eq!(s2.run_count() - 1, 1);
    assert_eq!(s1.run_count() - 1, 1);
    assert_eq!(obj.get("extra"), Some(Value::from(6)));
}
