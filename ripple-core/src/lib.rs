//! Ripple Core
//!
//! Automatic, fine-grained dependency tracking for ordinary records and
//! sequences. Once a value is observed:
//!
//! - any read of one of its properties made while a subscriber is active
//!   records that subscriber as a dependent, and
//! - any write to that property re-runs every dependent,
//!
//! without the data owner calling subscribe or publish explicitly.
//!
//! # Architecture
//!
//! - `value`: the closed [`Value`](value::Value) type and the
//!   [`Record`](value::Record) and [`Sequence`](value::Sequence) containers
//! - `reactive`: subscribers, the active-subscriber slot, dependency sets
//! - `observer`: `observe`, instrumented properties, the sequence
//!   interceptor, and the `set` / `delete` mutation API
//! - `config`: process-wide switches
//!
//! Deciding when a notified subscriber actually re-runs (batching,
//! scheduling) is left to the subscriber.
//!
//! # Example
//!
//! ```rust
//! use ripple_core::observer::{observe, set};
//! use ripple_core::reactive::Watcher;
//! use ripple_core::value::{Record, Value};
//!
//! let state = Record::from_iter([("count", 0)]);
//! observe(&Value::from(&state), true);
//!
//! let view = state.clone();
//! let render = Watcher::new(move || {
//!     let _ = view.get("count");
//! });
//!
//! // Plain assignment through the instrumented property re-runs the watcher.
//! state.assign("count", 1);
//! assert_eq!(render.run_count(), 2);
//!
//! // Writing the same value again does nothing.
//! set(&state, "count", 1);
//! assert_eq!(render.run_count(), 2);
//! ```

pub mod config;
pub mod error;
pub mod observer;
pub mod reactive;
pub mod value;

pub use config::{config, configure, Config};
pub use error::MutationError;
pub use observer::{
    define_reactive, delete, observe, set, toggle_observing, try_delete, try_set, Observer,
};
pub use reactive::{Dep, Subscriber, SubscriberId, TrackingScope, Watcher};
pub use value::{Key, Record, Sequence, Value};
