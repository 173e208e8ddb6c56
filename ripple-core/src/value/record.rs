//! Records
//!
//! A record is an ordered map from names to properties. A property is plain
//! data, a custom accessor pair, or an instrumented property installed by
//! [`define_reactive`](crate::observer::define_reactive). Reads and
//! assignments go through whichever kind is stored, so code that holds a
//! record does not need to know whether it has been observed.
//!
//! # Locking
//!
//! The property map sits behind a read-write lock. Every operation copies
//! what it needs out of the map and releases the lock before running a
//! getter, setter, or notification, so subscribers re-run by a write can
//! read the same record again.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::Value;
use crate::observer::{Observer, ReactiveProperty};

/// Custom read half of an accessor property.
pub type Getter = Arc<dyn Fn() -> Value + Send + Sync>;

/// Custom write half of an accessor property.
pub type Setter = Arc<dyn Fn(Value) + Send + Sync>;

/// What a record stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Ordinary data. Eligible for observation.
    Plain,
    /// A component instance that owns root state. Never observed, and the
    /// mutation API refuses to add or delete its keys.
    Instance,
}

/// A getter/setter pair stored on a record.
#[derive(Clone, Default)]
pub struct Accessor {
    pub getter: Option<Getter>,
    pub setter: Option<Setter>,
}

#[derive(Clone)]
pub(crate) enum PropertyKind {
    Data(Value),
    Accessor(Accessor),
    Reactive(Arc<ReactiveProperty>),
}

/// A property descriptor.
#[derive(Clone)]
pub struct Property {
    pub(crate) kind: PropertyKind,
    configurable: bool,
    enumerable: bool,
}

impl Property {
    /// A configurable, enumerable data property.
    pub fn data(value: impl Into<Value>) -> Self {
        Self::from_kind(PropertyKind::Data(value.into()))
    }

    /// A configurable, enumerable accessor property.
    ///
    /// A getter without a setter makes a read-only derived property; writes
    /// to it are dropped.
    pub fn accessor(getter: Option<Getter>, setter: Option<Setter>) -> Self {
        Self::from_kind(PropertyKind::Accessor(Accessor { getter, setter }))
    }

    pub(crate) fn reactive(cell: Arc<ReactiveProperty>) -> Self {
        Self::from_kind(PropertyKind::Reactive(cell))
    }

    fn from_kind(kind: PropertyKind) -> Self {
        Self {
            kind,
            configurable: true,
            enumerable: true,
        }
    }

    /// Lock the property: it can no longer be redefined or removed, and
    /// observation will not instrument it.
    pub fn non_configurable(mut self) -> Self {
        self.configurable = false;
        self
    }

    /// Hide the property from key enumeration and from observation walks.
    pub fn hidden(mut self) -> Self {
        self.enumerable = false;
        self
    }

    pub fn is_configurable(&self) -> bool {
        self.configurable
    }

    pub fn is_enumerable(&self) -> bool {
        self.enumerable
    }

    /// Whether this property was installed by observation.
    pub fn is_reactive(&self) -> bool {
        matches!(self.kind, PropertyKind::Reactive(_))
    }

    /// The accessor pair a property exposes, as seen by a caller layering a
    /// new accessor on top of it.
    pub(crate) fn accessor_pair(&self) -> Accessor {
        match &self.kind {
            PropertyKind::Data(_) => Accessor::default(),
            PropertyKind::Accessor(accessor) => accessor.clone(),
            PropertyKind::Reactive(cell) => {
                let (read, write) = (cell.clone(), cell.clone());
                Accessor {
                    getter: Some(Arc::new(move || read.get())),
                    setter: Some(Arc::new(move |value| write.set(value))),
                }
            }
        }
    }
}

struct RecordInner {
    kind: RecordKind,
    props: RwLock<IndexMap<String, Property>>,
    extensible: AtomicBool,
    frozen: AtomicBool,
    observer: OnceLock<Arc<Observer>>,
}

/// Shared handle to a record.
#[derive(Clone)]
pub struct Record {
    inner: Arc<RecordInner>,
}

impl Record {
    /// Create an empty plain record.
    pub fn new() -> Self {
        Self::with_kind(RecordKind::Plain)
    }

    /// Create an empty record of the given kind.
    pub fn with_kind(kind: RecordKind) -> Self {
        Self {
            inner: Arc::new(RecordInner {
                kind,
                props: RwLock::new(IndexMap::new()),
                extensible: AtomicBool::new(true),
                frozen: AtomicBool::new(false),
                observer: OnceLock::new(),
            }),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.inner.kind
    }

    /// Check whether both handles point at the same record.
    pub fn ptr_eq(&self, other: &Record) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Define a plain data property, replacing whatever was stored under
    /// `key`. Returns false if the existing property is non-configurable or
    /// the key is new and the record is not extensible.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        self.define(key, Property::data(value))
    }

    /// Define a property, replacing whatever was stored under `key`.
    ///
    /// Defining over an instrumented property replaces it; reads of the new
    /// property are not tracked.
    pub fn define(&self, key: impl Into<String>, property: Property) -> bool {
        let key = key.into();
        let mut props = self.inner.props.write();
        match props.get(&key) {
            Some(existing) if !existing.configurable => false,
            None if !self.is_extensible() => false,
            _ => {
                props.insert(key, property);
                true
            }
        }
    }

    /// Read a property.
    ///
    /// Instrumented properties record the read into the active subscriber's
    /// dependencies. Plain data and custom accessors are not tracked.
    pub fn get(&self, key: &str) -> Option<Value> {
        let kind = self.inner.props.read().get(key).map(|p| p.kind.clone())?;
        Some(match kind {
            PropertyKind::Data(value) => value,
            PropertyKind::Accessor(accessor) => {
                accessor.getter.map_or(Value::Null, |getter| getter())
            }
            PropertyKind::Reactive(cell) => cell.get(),
        })
    }

    /// Ordinary assignment.
    ///
    /// Instrumented properties notify their dependents. Custom setters are
    /// invoked; accessors without a setter ignore the write. A new key is
    /// added as plain, untracked data: adding keys reactively requires
    /// [`set`](crate::observer::set).
    pub fn assign(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let existing = self.inner.props.read().get(key).map(|p| p.kind.clone());
        match existing {
            Some(PropertyKind::Reactive(cell)) => cell.set(value),
            Some(PropertyKind::Accessor(accessor)) => {
                if let Some(setter) = accessor.setter {
                    setter(value);
                }
            }
            Some(PropertyKind::Data(_)) | None => {
                if self.is_frozen() {
                    return;
                }
                let mut props = self.inner.props.write();
                match props.get_mut(key) {
                    Some(Property {
                        kind: PropertyKind::Data(slot),
                        ..
                    }) => *slot = value,
                    Some(_) => {}
                    None if self.is_extensible() => {
                        props.insert(key.to_owned(), Property::data(value));
                    }
                    None => {}
                }
            }
        }
    }

    /// Remove a property. Returns false if it is absent or non-configurable.
    ///
    /// Nothing is notified; use [`delete`](crate::observer::delete) for a
    /// reactive removal.
    pub fn remove(&self, key: &str) -> bool {
        let mut props = self.inner.props.write();
        match props.get(key) {
            Some(p) if p.configurable => {
                props.shift_remove(key);
                true
            }
            _ => false,
        }
    }

    /// Read a property without recording a dependency.
    pub fn get_untracked(&self, key: &str) -> Option<Value> {
        let _scope = crate::reactive::TrackingScope::untracked();
        self.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.props.read().contains_key(key)
    }

    /// A copy of the descriptor stored under `key`.
    pub fn property(&self, key: &str) -> Option<Property> {
        self.inner.props.read().get(key).cloned()
    }

    /// Check whether `key` holds an instrumented property.
    pub fn is_reactive(&self, key: &str) -> bool {
        self.inner
            .props
            .read()
            .get(key)
            .is_some_and(Property::is_reactive)
    }

    /// All own keys, in definition order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.props.read().keys().cloned().collect()
    }

    /// Enumerable keys, in definition order.
    pub(crate) fn enumerable_keys(&self) -> Vec<String> {
        self.inner
            .props
            .read()
            .iter()
            .filter(|(_, p)| p.enumerable)
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.props.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forbid new keys. A non-extensible record is not eligible for
    /// observation.
    pub fn prevent_extensions(&self) {
        self.inner.extensible.store(false, Ordering::SeqCst);
    }

    /// Forbid new keys, lock every property, and make data read-only.
    pub fn freeze(&self) {
        self.prevent_extensions();
        self.inner.frozen.store(true, Ordering::SeqCst);
        for property in self.inner.props.write().values_mut() {
            property.configurable = false;
        }
    }

    pub fn is_extensible(&self) -> bool {
        self.inner.extensible.load(Ordering::SeqCst)
    }

    pub fn is_frozen(&self) -> bool {
        self.inner.frozen.load(Ordering::SeqCst)
    }

    /// The observer attached to this record, if it has been observed.
    pub fn observer(&self) -> Option<Arc<Observer>> {
        self.inner.observer.get().cloned()
    }

    /// Attach `observer`, or return the one a concurrent caller won with.
    pub(crate) fn attach_observer(&self, observer: Arc<Observer>) -> Result<(), Arc<Observer>> {
        let stored = self.inner.observer.get_or_init(|| observer.clone());
        if Arc::ptr_eq(stored, &observer) {
            Ok(())
        } else {
            Err(stored.clone())
        }
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let record = Record::new();
        {
            let mut props = record.inner.props.write();
            for (key, value) in iter {
                props.insert(key.into(), Property::data(value));
            }
        }
        record
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("kind", &self.kind())
            .field("keys", &self.keys())
            .field("observed", &self.observer().is_some())
            .finish()
    }
}
