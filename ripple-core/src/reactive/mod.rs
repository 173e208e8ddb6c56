//! Dependency Tracking Primitives
//!
//! This module holds the pieces every observed value is built on: the
//! subscriber identity, the thread-local active-subscriber slot, and the
//! dependency set.
//!
//! # Concepts
//!
//! ## Subscribers
//!
//! A subscriber is any computation that can be asked to re-run. While it is
//! installed in the active slot, every instrumented read it performs records
//! it into that read's dependency set.
//!
//! ## Dependency Sets
//!
//! A [`Dep`] belongs to one reactive slot. `depend()` attaches the active
//! subscriber; `notify()` re-runs every attached subscriber.
//!
//! ## Watchers
//!
//! [`Watcher`] is the smallest useful subscriber: a closure that runs once
//! on creation and again on every notification.
//!
//! # Implementation Notes
//!
//! The active slot is thread-local, so tracking passes on different threads
//! never see each other. Dependency sets themselves are `Send + Sync` and
//! serialize membership changes behind a mutex.

mod context;
mod dep;
mod subscriber;
mod watcher;

pub use context::{current_subscriber, is_tracking, set_active, TrackingScope};
pub use dep::{Dep, DepId};
pub use subscriber::{Subscriber, SubscriberId};
pub use watcher::Watcher;
