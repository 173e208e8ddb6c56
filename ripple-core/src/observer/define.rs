//! Instrumented Properties
//!
//! [`define_reactive`] replaces one property of a record with a
//! [`ReactiveProperty`]: a slot with its own dependency set whose reads
//! depend and whose writes notify.
//!
//! Any accessor pair already stored under the key is kept underneath, so a
//! computed property keeps computing and a getter-only property stays
//! read-only.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{depend_sequence, observe, Observer};
use crate::config;
use crate::reactive::{is_tracking, Dep};
use crate::value::{Getter, Property, Record, Setter, Value};

/// Hook run before an instrumented write is applied. Diagnostics only: it
/// is skipped unless diagnostics are enabled.
pub type WriteHook = Arc<dyn Fn() + Send + Sync>;

/// Options for [`define_reactive`].
#[derive(Clone, Default)]
pub struct DefineOptions {
    /// Initial value. Without one, the current value of the property is
    /// used.
    pub value: Option<Value>,
    pub on_write: Option<WriteHook>,
    /// Do not observe the value; only the property itself is reactive.
    pub shallow: bool,
}

impl DefineOptions {
    /// Options that install `value` as the initial value.
    pub fn with_value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn on_write(mut self, hook: WriteHook) -> Self {
        self.on_write = Some(hook);
        self
    }

    pub fn shallow(mut self) -> Self {
        self.shallow = true;
        self
    }
}

/// The state behind one instrumented property.
pub struct ReactiveProperty {
    dep: Dep,
    getter: Option<Getter>,
    setter: Option<Setter>,
    value: RwLock<Value>,
    child: RwLock<Option<Arc<Observer>>>,
    on_write: Option<WriteHook>,
    shallow: bool,
}

impl ReactiveProperty {
    /// The property's private dependency set.
    pub fn dep(&self) -> &Dep {
        &self.dep
    }

    /// Observer of the current value, if it is an observed container and the
    /// property is not shallow.
    pub fn child_observer(&self) -> Option<Arc<Observer>> {
        self.child.read().clone()
    }

    fn resolve(&self) -> Value {
        match &self.getter {
            Some(getter) => getter(),
            None => self.value.read().clone(),
        }
    }

    /// Tracked read.
    pub fn get(&self) -> Value {
        let value = self.resolve();
        if is_tracking() {
            self.dep.depend();
            if let Some(child) = self.child_observer() {
                child.dep().depend();
                if let Value::Sequence(seq) = &value {
                    depend_sequence(seq);
                }
            }
        }
        value
    }

    /// Notifying write. Writing the current value does nothing.
    pub fn set(&self, new: Value) {
        let old = self.resolve();
        if new.same_value(&old) {
            return;
        }
        if let Some(hook) = &self.on_write {
            if config::diagnostics_enabled() {
                hook();
            }
        }
        match (&self.getter, &self.setter) {
            (Some(_), None) => return,
            (_, Some(setter)) => setter(new.clone()),
            (None, None) => *self.value.write() = new.clone(),
        }
        let child = if self.shallow {
            None
        } else {
            observe(&new, false)
        };
        *self.child.write() = child;
        self.dep.notify();
    }
}

impl fmt::Debug for ReactiveProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveProperty")
            .field("dep", &self.dep)
            .field("computed", &self.getter.is_some())
            .field("shallow", &self.shallow)
            .finish()
    }
}

/// Make `key` on `record` reactive.
///
/// Returns false, leaving the record untouched, if the existing property is
/// non-configurable or the key is new and the record is not extensible.
pub fn define_reactive(record: &Record, key: &str, options: DefineOptions) -> bool {
    let existing = record.property(key);
    if existing.as_ref().is_some_and(|p| !p.is_configurable()) {
        return false;
    }

    let accessor = existing
        .as_ref()
        .map(Property::accessor_pair)
        .unwrap_or_default();

    let value = match options.value {
        Some(value) => value,
        None if accessor.getter.is_none() || accessor.setter.is_some() => {
            record.get_untracked(key).unwrap_or_default()
        }
        None => Value::Null,
    };

    let child = if options.shallow {
        None
    } else {
        observe(&value, false)
    };

    let cell = Arc::new(ReactiveProperty {
        dep: Dep::new(),
        getter: accessor.getter,
        setter: accessor.setter,
        value: RwLock::new(value),
        child: RwLock::new(child),
        on_write: options.on_write,
        shallow: options.shallow,
    });

    record.define(key, Property::reactive(cell))
}
