//! Subscriber types for the reactive system.
//!
//! A Subscriber represents any computation that depends on observed values:
//! a render pass, a derived value, a watcher. The core only ever asks a
//! subscriber for its identity and asks it to re-run.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a subscriber.
///
/// Dependency sets key their members by this ID, which is how re-depending
/// the same subscriber stays a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// A computation that can be recorded into dependency sets.
///
/// Implementors install themselves as the active subscriber around a read
/// pass (see [`TrackingScope`](super::TrackingScope)). When any value they
/// read changes, [`update`](Subscriber::update) is called synchronously
/// from inside the write.
pub trait Subscriber: Send + Sync {
    /// Stable identity used for deduplication.
    fn id(&self) -> SubscriberId;

    /// One of the values read during the last pass changed.
    ///
    /// What "re-run" means (immediately, queued, batched) is up to the
    /// implementor.
    fn update(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_ids_are_unique() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();
        let id3 = SubscriberId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn subscriber_ids_increase() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();
        assert!(id2 > id1);
        assert_eq!(id1.to_string(), format!("sub#{}", id1.raw()));
    }
}
