//! Sequences
//!
//! A sequence is an ordered, shared list of values. This module holds the
//! storage and the operations the observer does not intercept: reads and the
//! two raw writes. The mutating operations that notify dependents live in
//! the observer's interceptor.
//!
//! # Limitations
//!
//! [`Sequence::assign`] and [`Sequence::set_len`] change the sequence
//! without notifying anyone, even when it is observed. Use
//! [`set`](crate::observer::set) and [`delete`](crate::observer::delete) for
//! position-based changes that should be seen.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use super::Value;
use crate::observer::Observer;

struct SequenceInner {
    items: RwLock<Vec<Value>>,
    extensible: AtomicBool,
    frozen: AtomicBool,
    observer: OnceLock<Arc<Observer>>,
}

/// Shared handle to a sequence.
#[derive(Clone)]
pub struct Sequence {
    inner: Arc<SequenceInner>,
}

impl Sequence {
    /// Longest length a sequence may reach through positional writes.
    pub const MAX_LEN: usize = u32::MAX as usize;

    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    /// Check whether both handles point at the same sequence.
    pub fn ptr_eq(&self, other: &Sequence) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn addr(&self) -> *const () {
        Arc::as_ptr(&self.inner) as *const ()
    }

    /// Element at `index`. Not tracked.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.items.read().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the current elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.items.read().clone()
    }

    /// Write `value` at `index`, padding with `Null` if the index is past
    /// the end. Indices that would grow the sequence past
    /// [`MAX_LEN`](Self::MAX_LEN) are ignored.
    ///
    /// Not observable: dependents of the sequence are not notified and the
    /// new value is not observed.
    pub fn assign(&self, index: usize, value: impl Into<Value>) {
        if self.is_frozen() {
            return;
        }
        let mut items = self.inner.items.write();
        if index >= items.len() {
            let len = match index.checked_add(1) {
                Some(len) if len <= Self::MAX_LEN && self.is_extensible() => len,
                _ => return,
            };
            items.resize(len, Value::Null);
        }
        items[index] = value.into();
    }

    /// Truncate, or pad with `Null`, to exactly `len` elements. Lengths
    /// past [`MAX_LEN`](Self::MAX_LEN) are ignored.
    ///
    /// Not observable, like [`assign`](Sequence::assign).
    pub fn set_len(&self, len: usize) {
        if self.is_frozen() || len > Self::MAX_LEN {
            return;
        }
        let mut items = self.inner.items.write();
        if len > items.len() && !self.is_extensible() {
            return;
        }
        items.resize(len, Value::Null);
    }

    /// Forbid growth through raw writes. A non-extensible sequence is not
    /// eligible for observation.
    pub fn prevent_extensions(&self) {
        self.inner.extensible.store(false, Ordering::SeqCst);
    }

    /// Forbid every change.
    pub fn freeze(&self) {
        self.prevent_extensions();
        self.inner.frozen.store(true, Ordering::SeqCst);
    }

    pub fn is_extensible(&self) -> bool {
        self.inner.extensible.load(Ordering::SeqCst)
    }

    pub fn is_frozen(&self) -> bool {
        self.inner.frozen.load(Ordering::SeqCst)
    }

    /// The observer attached to this sequence, if it has been observed.
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

    /// Run `f` against the raw storage.
    pub(crate) fn with_items_mut<R>(&self, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
        f(&mut self.inner.items.write())
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Value>> for Sequence {
    fn from(items: Vec<Value>) -> Self {
        Self {
            inner: Arc::new(SequenceInner {
                items: RwLock::new(items),
                extensible: AtomicBool::new(true),
                frozen: AtomicBool::new(false),
                observer: OnceLock::new(),
            }),
        }
    }
}

impl<V: Into<Value>> FromIterator<V> for Sequence {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from(iter.into_iter().map(Into::into).collect::<Vec<_>>())
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("len", &self.len())
            .field("observed", &self.observer().is_some())
            .finish()
    }
}
