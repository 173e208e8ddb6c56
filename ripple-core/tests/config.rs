//! Process-wide switches.
//!
//! Every test here changes global state, so they take a shared lock and
//! restore the defaults before releasing it.

use parking_lot::{Mutex, MutexGuard};

use ripple_core::config::{config, configure, Config};
use ripple_core::observer::{observe, set, should_observe, toggle_observing};
use ripple_core::reactive::Watcher;
use ripple_core::value::{Record, Sequence, Value};

static GLOBAL: Mutex<()> = Mutex::new(());

struct Restore<'a> {
    _lock: MutexGuard<'a, ()>,
}

impl Drop for Restore<'_> {
    fn drop(&mut self) {
        toggle_observing(true);
        configure(Config::default());
    }
}

fn exclusive() -> Restore<'static> {
    Restore {
        _lock: GLOBAL.lock(),
    }
}

#[test]
fn toggle_observing_suspends_new_observers() {
    let _guard = exclusive();
    let already = Value::from(Record::from_iter([("a", 1)]));
    let before = observe(&already, false).unwrap();

    toggle_observing(false);
    assert!(!should_observe());

    let fresh = Value::from(Record::from_iter([("a", 1)]));
    assert!(observe(&fresh, false).is_none());
    assert!(!fresh.as_record().unwrap().is_reactive("a"));

    // Existing observers are still returned.
    let again = observe(&already, false).unwrap();
    assert!(std::sync::Arc::ptr_eq(&before, &again));

    toggle_observing(true);
    assert!(observe(&fresh, false).is_some());
}

#[test]
fn values_written_while_suspended_stay_plain() {
    let _guard = exclusive();
    let state = Record::from_iter([("child", Value::Null)]);
    observe(&Value::from(&state), false);

    toggle_observing(false);
    let child = Sequence::from_iter([1]);
    state.assign("child", &child);
    toggle_observing(true);

    assert!(child.observer().is_none());
    assert!(state.is_reactive("child"));
}

#[test]
fn server_rendering_never_observes() {
    let _guard = exclusive();
    configure(Config {
        server_rendering: true,
        ..Config::default()
    });
    assert!(config().server_rendering);

    let record = Value::from(Record::from_iter([("a", 1)]));
    assert!(observe(&record, true).is_none());

    configure(Config::default());
    assert!(observe(&record, true).is_some());
}

#[test]
fn performance_mode_still_observes_roots() {
    let _guard = exclusive();
    let previous = configure(Config {
        performance: true,
        ..Config::default()
    });
    assert_eq!(previous, Config::default());

    let record = Value::from(Record::from_iter([("a", 1)]));
    let observer = observe(&record, true).unwrap();
    assert_eq!(observer.root_count(), 1);
}

#[test]
fn rejected_mutations_return_the_value_without_diagnostics() {
    let _guard = exclusive();
    configure(Config {
        diagnostics: false,
        ..Config::default()
    });

    let root = Value::from(Record::new());
    observe(&root, true);
    assert_eq!(set(&root, "late", 3), Value::from(3));
    assert_eq!(set(Value::Null, "a", 4), Value::from(4));
    assert!(root.as_record().unwrap().is_empty());
}

#[test]
fn on_write_hook_follows_diagnostics_switch() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use ripple_core::observer::{define_reactive, DefineOptions};

    let _guard = exclusive();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    let record = Record::new();
    define_reactive(
        &record,
        "a",
        DefineOptions::with_value(0).on_write(Arc::new(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        })),
    );
    let reader = {
        let record = record.clone();
        Watcher::new(move || {
            let _ = record.get("a");
        })
    };

    configure(Config {
        diagnostics: false,
        ..Config::default()
    });
    record.assign("a", 1);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    configure(Config {
        diagnostics: true,
        ..Config::default()
    });
    record.assign("a", 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(reader.run_count(), 3);
}
