//! Watcher Implementation
//!
//! A Watcher is a minimal subscriber: it runs a closure inside a tracking
//! pass, and runs it again whenever anything it read changes.
//!
//! # How Watchers Work
//!
//! 1. When created, the watcher runs its function immediately so the reads
//!    it performs register it in the matching dependency sets.
//!
//! 2. When any of those sets is notified, the watcher re-runs synchronously,
//!    inside the write that caused the notification.
//!
//! 3. Re-runs perform fresh reads, which re-register the watcher. Stale
//!    registrations from earlier runs are not removed.
//!
//! Watchers do no batching or scheduling. Anything smarter (queues, dirty
//! flags, deduplication across writes) belongs in a driver built on the
//! [`Subscriber`] trait.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use super::context::TrackingScope;
use super::subscriber::{Subscriber, SubscriberId};

/// A computation that re-runs when the observed values it read change.
///
/// # Example
///
/// ```rust
/// use ripple_core::observer::observe;
/// use ripple_core::reactive::Watcher;
/// use ripple_core::value::{Record, Value};
///
/// let state = Record::from_iter([("count", Value::from(0))]);
/// observe(&Value::from(state.clone()), false);
///
/// let reader = state.clone();
/// let watcher = Watcher::new(move || {
///     let _ = reader.get("count");
/// });
///
/// state.assign("count", 1);
/// assert_eq!(watcher.run_count(), 2);
/// ```
pub struct Watcher {
    id: SubscriberId,
    this: Weak<Watcher>,
    run: Box<dyn Fn() + Send + Sync>,
    disposed: AtomicBool,
    run_count: AtomicUsize,
}

impl Watcher {
    /// Create a watcher and run it once to collect its dependencies.
    pub fn new<F>(run: F) -> Arc<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let watcher = Self::new_lazy(run);
        watcher.execute();
        watcher
    }

    /// Create a watcher without running it.
    ///
    /// Nothing is tracked until [`execute`](Watcher::execute) is called.
    pub fn new_lazy<F>(run: F) -> Arc<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        Arc::new_cyclic(|this| Self {
            id: SubscriberId::new(),
            this: this.clone(),
            run: Box::new(run),
            disposed: AtomicBool::new(false),
            run_count: AtomicUsize::new(0),
        })
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Run the function inside a tracking pass.
    pub fn execute(&self) {
        if self.is_disposed() {
            return;
        }
        let Some(this) = self.this.upgrade() else {
            return;
        };

        {
            let _scope = TrackingScope::enter(this);
            (self.run)();
        }

        self.run_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Stop re-running. Registrations already made are left in place and
    /// pruned lazily once the watcher is dropped.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    /// Check if the watcher has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Get the number of times the function has run.
    pub fn run_count(&self) -> usize {
        self.run_count.load(Ordering::SeqCst)
    }
}

impl Subscriber for Watcher {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn update(&self) {
        self.execute();
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("id", &self.id)
            .field("run_count", &self.run_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
