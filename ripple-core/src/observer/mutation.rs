//! Dynamic Mutation
//!
//! Instrumentation is installed when a container is first observed, so two
//! kinds of change escape it: adding a key that did not exist, and writing
//! into a sequence by position. [`set`] and [`delete`] perform those changes
//! observably.
//!
//! The `try_` forms return a [`MutationError`] for rejected calls. The plain
//! forms report the error as a diagnostic and return normally; `set` always
//! returns the value it was given.

use super::{define_reactive, DefineOptions};
use crate::error::MutationError;
use crate::value::{Key, Record, RecordKind, Sequence, Value};

/// Set `key` on `target`, adding it reactively if it is new.
pub fn set(target: impl Into<Value>, key: impl Into<Key>, value: impl Into<Value>) -> Value {
    let value = value.into();
    try_set(target, key, value.clone()).unwrap_or_else(|err| {
        err.report();
        value
    })
}

/// Delete `key` from `target`, notifying dependents of its shape.
pub fn delete(target: impl Into<Value>, key: impl Into<Key>) {
    if let Err(err) = try_delete(target, key) {
        err.report();
    }
}

/// Strict form of [`set`].
///
/// - On a sequence, an index key replaces the element at that position
///   (growing the sequence if needed) through `splice`, which notifies.
/// - On a record, an existing key is assigned through its accessor.
/// - A new key on an unobserved record is added as plain data.
/// - A new key on an observed record becomes an instrumented property and
///   the record's own dependency set is notified.
/// - A new key on a record that is not extensible is rejected, and nothing
///   is notified.
/// - Positions at or past [`Sequence::MAX_LEN`] are rejected.
pub fn try_set(
    target: impl Into<Value>,
    key: impl Into<Key>,
    value: impl Into<Value>,
) -> Result<Value, MutationError> {
    let (target, key, value) = (target.into(), key.into(), value.into());
    match &target {
        Value::Sequence(seq) => {
            let index = sequence_index(key)?;
            seq.set_len(seq.len().max(index));
            seq.splice(index, 1, [value.clone()]);
            Ok(value)
        }
        Value::Record(record) => set_on_record(record, key, value),
        other => Err(MutationError::InvalidTarget {
            op: "set",
            target: other.type_name(),
        }),
    }
}

fn set_on_record(record: &Record, key: Key, value: Value) -> Result<Value, MutationError> {
    let name = key.as_name();
    if record.contains_key(&name) {
        record.assign(&name, value.clone());
        return Ok(value);
    }

    let observer = record.observer();
    if is_root(record, observer.as_ref().map(|ob| ob.root_count())) {
        return Err(MutationError::AddToRoot {
            key: key.clone(),
        });
    }
    if !record.is_extensible() {
        return Err(MutationError::NotExtensible { key: key.clone() });
    }
    let Some(observer) = observer else {
        record.assign(&name, value.clone());
        return Ok(value);
    };

    if !define_reactive(record, &name, DefineOptions::with_value(value.clone())) {
        return Err(MutationError::NotExtensible { key: key.clone() });
    }
    observer.dep().notify();
    Ok(value)
}

/// The position `key` denotes on a sequence, bounded by the longest
/// sequence allowed.
fn sequence_index(key: Key) -> Result<usize, MutationError> {
    let index = key
        .as_index()
        .ok_or(MutationError::UnsupportedKey { key })?;
    if index >= Sequence::MAX_LEN {
        return Err(MutationError::IndexOutOfRange { index });
    }
    Ok(index)
}

/// Strict form of [`delete`].
///
/// - On a sequence, an index key removes that element through `splice`.
/// - On a record, a missing key is a no-op; otherwise the key is removed
///   and, if the record is observed, its own dependency set is notified.
pub fn try_delete(target: impl Into<Value>, key: impl Into<Key>) -> Result<(), MutationError> {
    let (target, key) = (target.into(), key.into());
    match &target {
        Value::Sequence(seq) => {
            let index = sequence_index(key)?;
            seq.splice(index, 1, []);
            Ok(())
        }
        Value::Record(record) => {
            let observer = record.observer();
            if is_root(record, observer.as_ref().map(|ob| ob.root_count())) {
                return Err(MutationError::DeleteFromRoot { key });
            }
            let name = key.as_name();
            if !record.remove(&name) {
                return Ok(());
            }
            if let Some(observer) = observer {
                observer.dep().notify();
            }
            Ok(())
        }
        other => Err(MutationError::InvalidTarget {
            op: "delete",
            target: other.type_name(),
        }),
    }
}

fn is_root(record: &Record, root_count: Option<usize>) -> bool {
    record.kind() == RecordKind::Instance || root_count.is_some_and(|n| n > 0)
}
