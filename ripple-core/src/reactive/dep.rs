//! Dependency Set
//!
//! A [`Dep`] is attached to one reactive slot: an instrumented property, or
//! the shape of an observed container. It remembers every subscriber that
//! read the slot during a tracking pass and re-runs them when the slot is
//! written.
//!
//! # Membership
//!
//! - Members are keyed by [`SubscriberId`], so depending twice is a no-op.
//! - Members are held weakly. A set never keeps a subscriber alive; a
//!   dropped subscriber is skipped and pruned at the next notify.
//! - Iteration follows registration order.
//!
//! # Thread Safety
//!
//! Membership sits behind a mutex. `notify` snapshots the members and
//! releases the lock before calling any subscriber, so a subscriber's re-run
//! can depend on the same set again without deadlocking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;
use smallvec::SmallVec;

use super::context;
use super::subscriber::{Subscriber, SubscriberId};

/// Unique identifier for a dependency set, used in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepId(u64);

impl DepId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A set of subscribers interested in one reactive slot.
pub struct Dep {
    id: DepId,
    subs: Mutex<IndexMap<SubscriberId, Weak<dyn Subscriber>>>,
}

impl Dep {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            id: DepId::next(),
            subs: Mutex::new(IndexMap::new()),
        }
    }

    /// Get the set's unique ID.
    pub fn id(&self) -> DepId {
        self.id
    }

    /// Attach the active subscriber, if there is one.
    pub fn depend(&self) {
        if let Some(subscriber) = context::current_subscriber() {
            self.add_sub(&subscriber);
        }
    }

    /// Attach `subscriber` directly, outside of a tracking pass.
    pub fn add_sub(&self, subscriber: &Arc<dyn Subscriber>) {
        let id = subscriber.id();
        let mut subs = self.subs.lock();
        if !subs.contains_key(&id) {
            tracing::trace!(dep = self.id.0, subscriber = %id, "depend");
            subs.insert(id, Arc::downgrade(subscriber));
        }
    }

    /// Detach a subscriber.
    ///
    /// The core never calls this; drivers that track their own dependency
    /// lists use it to drop stale registrations.
    pub fn remove_sub(&self, id: SubscriberId) -> bool {
        self.subs.lock().shift_remove(&id).is_some()
    }

    /// Re-run every attached subscriber, in registration order.
    pub fn notify(&self) {
        let snapshot: SmallVec<[(SubscriberId, Weak<dyn Subscriber>); 4]> = self
            .subs
            .lock()
            .iter()
            .map(|(id, weak)| (*id, weak.clone()))
            .collect();

        if snapshot.is_empty() {
            return;
        }

        tracing::trace!(dep = self.id.0, subscribers = snapshot.len(), "notify");

        let mut dropped: SmallVec<[SubscriberId; 4]> = SmallVec::new();
        for (id, weak) in snapshot {
            match weak.upgrade() {
                Some(subscriber) => subscriber.update(),
                None => dropped.push(id),
            }
        }

        if !dropped.is_empty() {
            let mut subs = self.subs.lock();
            for id in dropped {
                subs.shift_remove(&id);
            }
        }
    }

    /// Number of registered subscribers, including ones not yet pruned.
    pub fn subscriber_count(&self) -> usize {
        self.subs.lock().len()
    }

    /// Check whether `id` is registered.
    pub fn has_subscriber(&self, id: SubscriberId) -> bool {
        self.subs.lock().contains_key(&id)
    }
}

impl Default for Dep {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("id", &self.id.0)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
