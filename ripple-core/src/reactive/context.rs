//! Active Subscriber Slot
//!
//! The slot holds the subscriber whose read pass is currently running, if
//! any. Every [`Dep::depend`](super::Dep::depend) call inspects it.
//!
//! # Implementation
//!
//! The slot is thread-local: each thread tracks its own pass and no
//! synchronization is needed to read it. The core never pushes or pops on
//! its own; a driver installs itself with [`TrackingScope::enter`] and the
//! guard restores whatever occupied the slot before, so nested passes
//! (a watcher whose run triggers another watcher's run) unwind correctly.

use std::cell::RefCell;
use std::sync::Arc;

use super::subscriber::{Subscriber, SubscriberId};

thread_local! {
    static ACTIVE: RefCell<Option<Arc<dyn Subscriber>>> = const { RefCell::new(None) };
}

/// Replace the active subscriber, returning the previous occupant.
///
/// Prefer [`TrackingScope`], which restores the previous value on drop.
pub fn set_active(subscriber: Option<Arc<dyn Subscriber>>) -> Option<Arc<dyn Subscriber>> {
    ACTIVE.with(|slot| std::mem::replace(&mut *slot.borrow_mut(), subscriber))
}

/// The subscriber currently tracking reads on this thread.
pub fn current_subscriber() -> Option<Arc<dyn Subscriber>> {
    ACTIVE.with(|slot| slot.borrow().clone())
}

/// Check if a tracking pass is in progress on this thread.
pub fn is_tracking() -> bool {
    ACTIVE.with(|slot| slot.borrow().is_some())
}

/// Guard that restores the previous slot occupant when dropped.
///
/// This keeps the slot consistent even if the read pass panics.
#[must_use = "the tracking pass ends when the scope is dropped"]
pub struct TrackingScope {
    previous: Option<Arc<dyn Subscriber>>,
    installed: Option<SubscriberId>,
}

impl TrackingScope {
    /// Install `subscriber` as the active subscriber until the guard drops.
    pub fn enter(subscriber: Arc<dyn Subscriber>) -> Self {
        let installed = Some(subscriber.id());
        let previous = set_active(Some(subscriber));
        Self { previous, installed }
    }

    /// Clear the slot until the guard drops, so reads are not recorded.
    pub fn untracked() -> Self {
        let previous = set_active(None);
        Self {
            previous,
            installed: None,
        }
    }
}

impl Drop for TrackingScope {
    fn drop(&mut self) {
        let popped = set_active(self.previous.take());

        // Catch scopes that were dropped out of order. Skipped while
        // unwinding so a panicking pass does not abort.
        if !std::thread::panicking() {
            debug_assert_eq!(
                popped.map(|s| s.id()),
                self.installed,
                "TrackingScope mismatch"
            );
        }
    }
}
