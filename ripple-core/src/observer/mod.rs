//! Observation
//!
//! This module turns plain records and sequences into observed ones.
//!
//! # How Observation Works
//!
//! 1. [`observe`] attaches an [`Observer`] to an eligible container. The
//!    observer owns a dependency set standing for the container's shape.
//!
//! 2. For a record, every enumerable property is replaced by an
//!    instrumented one ([`define_reactive`]). Reads of an instrumented
//!    property record the active subscriber; writes notify it.
//!
//! 3. For a sequence, the intercepted mutations (`push`, `pop`, `shift`,
//!    `unshift`, `splice`, `sort_by`, `reverse`) start observing inserted
//!    elements and notifying the sequence's own dependency set. Every
//!    current element is observed as well.
//!
//! 4. Keys added later, and writes by position into a sequence, go through
//!    [`set`] and [`delete`].
//!
//! # Eligibility
//!
//! A value gets a new observer only if it is a [`RecordKind::Plain`] record
//! or a sequence, it is extensible, observation is toggled on, and the
//! process is not in server-rendering mode. Re-observing a container that
//! already carries an observer always returns that observer.

mod define;
mod interceptor;
mod mutation;

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub use define::{define_reactive, DefineOptions, ReactiveProperty, WriteHook};
pub use interceptor::Method;
pub use mutation::{delete, set, try_delete, try_set};

use crate::config;
use crate::reactive::Dep;
use crate::value::{Record, RecordKind, Sequence, Value};

static SHOULD_OBSERVE: AtomicBool = AtomicBool::new(true);

/// Suspend or resume creation of new observers.
///
/// Containers that are already observed stay observed.
pub fn toggle_observing(enabled: bool) {
    SHOULD_OBSERVE.store(enabled, Ordering::SeqCst);
}

/// Whether new observers may be created.
pub fn should_observe() -> bool {
    SHOULD_OBSERVE.load(Ordering::SeqCst)
}

/// Which container an observer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Record,
    Sequence,
}

/// Per-container observation state.
///
/// The container owns its observer; the observer holds no reference back.
pub struct Observer {
    kind: ContainerKind,
    dep: Dep,
    root_count: AtomicUsize,
}

impl Observer {
    fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            dep: Dep::new(),
            root_count: AtomicUsize::new(0),
        }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Dependency set for the container as a whole: keys added or deleted,
    /// sequence mutations.
    pub fn dep(&self) -> &Dep {
        &self.dep
    }

    /// How many state trees use this container as their root.
    pub fn root_count(&self) -> usize {
        self.root_count.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("kind", &self.kind)
            .field("dep", &self.dep)
            .field("root_count", &self.root_count())
            .finish()
    }
}

/// Observe `value`, returning its observer.
///
/// Returns the existing observer if `value` is already observed, a new one
/// if it is eligible, and `None` otherwise. With `as_root`, the observer's
/// root count is incremented.
pub fn observe(value: &Value, as_root: bool) -> Option<Arc<Observer>> {
    let observer = match value {
        Value::Record(record) => record.observer().or_else(|| {
            (record.kind() == RecordKind::Plain && can_observe(record.is_extensible()))
                .then(|| timed(as_root, || observe_record(record)))
        }),
        Value::Sequence(seq) => seq.observer().or_else(|| {
            can_observe(seq.is_extensible()).then(|| timed(as_root, || observe_sequence(seq)))
        }),
        _ => None,
    }?;

    if as_root {
        observer.root_count.fetch_add(1, Ordering::SeqCst);
    }
    Some(observer)
}

fn can_observe(extensible: bool) -> bool {
    extensible && should_observe() && !config::is_server_rendering()
}

/// Measure root observations when performance tracing is on.
fn timed(as_root: bool, build: impl FnOnce() -> Arc<Observer>) -> Arc<Observer> {
    if !(as_root && config::performance_enabled()) {
        return build();
    }
    let start = Instant::now();
    let observer = build();
    tracing::debug!(
        kind = ?observer.kind,
        elapsed_us = start.elapsed().as_micros() as u64,
        "observe root"
    );
    observer
}

fn observe_record(record: &Record) -> Arc<Observer> {
    let observer = Arc::new(Observer::new(ContainerKind::Record));
    // Attach before walking so cycles back to this record terminate.
    if let Err(existing) = record.attach_observer(observer.clone()) {
        return existing;
    }
    tracing::debug!(keys = record.len(), "observing record");

    for key in record.enumerable_keys() {
        define_reactive(record, &key, DefineOptions::default());
    }
    observer
}

fn observe_sequence(seq: &Sequence) -> Arc<Observer> {
    let observer = Arc::new(Observer::new(ContainerKind::Sequence));
    if let Err(existing) = seq.attach_observer(observer.clone()) {
        return existing;
    }
    tracing::debug!(len = seq.len(), "observing sequence");

    for item in seq.to_vec() {
        observe(&item, false);
    }
    observer
}

/// Depend on the observer of every element of `seq`, recursing into nested
/// sequences. Element reads cannot be tracked one by one, so touching a
/// sequence through a property depends on all of it.
pub(crate) fn depend_sequence(seq: &Sequence) {
    let mut visited = HashSet::new();
    depend_sequence_inner(seq, &mut visited);
}

fn depend_sequence_inner(seq: &Sequence, visited: &mut HashSet<*const ()>) {
    if !visited.insert(seq.addr()) {
        return;
    }
    for item in seq.to_vec() {
        if let Some(observer) = item.observer() {
            observer.dep().depend();
        }
        if let Value::Sequence(inner) = &item {
            depend_sequence_inner(inner, visited);
        }
    }
}
