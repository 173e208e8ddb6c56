//! Sequence Mutation Interceptor
//!
//! The mutating operations of [`Sequence`]. Each one applies the change to
//! the raw storage and, when the sequence is observed, observes the
//! elements it inserted and notifies the sequence's own dependency set. On
//! an unobserved sequence they are plain mutations.
//!
//! Reads are not intercepted. Element access cannot be tracked one index at
//! a time; instead, reading a sequence through an instrumented property
//! depends on every element (see `depend_sequence`).
//!
//! Frozen sequences reject every mutation: nothing changes, nothing is
//! notified, and the operation returns what an empty change would.

use std::cmp::Ordering;
use std::fmt;

use smallvec::SmallVec;

use super::observe;
use crate::value::{Sequence, Value};

/// The intercepted operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Push,
    Pop,
    Shift,
    Unshift,
    Splice,
    Sort,
    Reverse,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::Push,
        Method::Pop,
        Method::Shift,
        Method::Unshift,
        Method::Splice,
        Method::Sort,
        Method::Reverse,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Method::Push => "push",
            Method::Pop => "pop",
            Method::Shift => "shift",
            Method::Unshift => "unshift",
            Method::Splice => "splice",
            Method::Sort => "sort",
            Method::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type Inserted = SmallVec<[Value; 4]>;

impl Sequence {
    /// Apply `mutate`, then observe `inserted` and notify if observed.
    fn intercept<R>(
        &self,
        method: Method,
        inserted: &[Value],
        mutate: impl FnOnce(&mut Vec<Value>) -> R,
    ) -> R {
        let result = self.with_items_mut(mutate);

        if let Some(observer) = self.observer() {
            for value in inserted {
                observe(value, false);
            }
            tracing::trace!(%method, inserted = inserted.len(), "sequence mutated");
            observer.dep().notify();
        }
        result
    }

    fn rejected(&self, method: Method) -> bool {
        if !self.is_frozen() {
            return false;
        }
        if crate::config::diagnostics_enabled() {
            tracing::warn!(%method, "cannot mutate a frozen sequence");
        }
        true
    }

    /// Append one element. Returns the new length.
    pub fn push(&self, value: impl Into<Value>) -> usize {
        self.extend([value.into()])
    }

    /// Append every element of `values`. Returns the new length.
    pub fn extend(&self, values: impl IntoIterator<Item = Value>) -> usize {
        if self.rejected(Method::Push) {
            return self.len();
        }
        let inserted: Inserted = values.into_iter().collect();
        self.intercept(Method::Push, &inserted, |items| {
            items.extend(inserted.iter().cloned());
            items.len()
        })
    }

    /// Remove and return the last element.
    pub fn pop(&self) -> Option<Value> {
        if self.rejected(Method::Pop) {
            return None;
        }
        self.intercept(Method::Pop, &[], Vec::pop)
    }

    /// Remove and return the first element.
    pub fn shift(&self) -> Option<Value> {
        if self.rejected(Method::Shift) {
            return None;
        }
        self.intercept(Method::Shift, &[], |items| {
            (!items.is_empty()).then(|| items.remove(0))
        })
    }

    /// Insert one element at the front. Returns the new length.
    pub fn unshift(&self, value: impl Into<Value>) -> usize {
        if self.rejected(Method::Unshift) {
            return self.len();
        }
        let value = value.into();
        self.intercept(Method::Unshift, std::slice::from_ref(&value), |items| {
            items.insert(0, value.clone());
            items.len()
        })
    }

    /// Remove `delete_count` elements starting at `start` and insert
    /// `values` in their place. Returns the removed elements.
    ///
    /// `start` past the end is clamped to the length, and `delete_count` to
    /// the number of elements after `start`.
    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        values: impl IntoIterator<Item = Value>,
    ) -> Vec<Value> {
        if self.rejected(Method::Splice) {
            return Vec::new();
        }
        let inserted: Inserted = values.into_iter().collect();
        self.intercept(Method::Splice, &inserted, |items| {
            let start = start.min(items.len());
            let end = start + delete_count.min(items.len() - start);
            items
                .splice(start..end, inserted.iter().cloned())
                .collect()
        })
    }

    /// Sort in place with `compare`. The sort is stable.
    ///
    /// The comparator runs on a copy outside the lock and may read the
    /// sequence; it sees the unsorted contents.
    pub fn sort_by(&self, compare: impl FnMut(&Value, &Value) -> Ordering) {
        if self.rejected(Method::Sort) {
            return;
        }
        let mut sorted = self.to_vec();
        sorted.sort_by(compare);
        self.intercept(Method::Sort, &[], |items| *items = sorted);
    }

    /// Reverse in place.
    pub fn reverse(&self) {
        if self.rejected(Method::Reverse) {
            return;
        }
        self.intercept(Method::Reverse, &[], |items| items.reverse());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Watcher;
    use crate::value::Record;
    use std::sync::Arc;

    fn observed(values: impl IntoIterator<Item = i32>) -> (Sequence, Arc<Watcher>) {
        let seq: Sequence = values.into_iter().collect();
        observe(&Value::from(&seq), false);
        let observer = seq.observer().unwrap();
        let watcher = Watcher::new(move || observer.dep().depend());
        (seq, watcher)
    }

    fn numbers(seq: &Sequence) -> Vec<f64> {
        seq.to_vec().iter().filter_map(Value::as_number).collect()
    }

    #[test]
    fn push_and_pop_notify() {
        let (seq, watcher) = observed([1, 2]);

        assert_eq!(seq.push(3), 3);
        assert_eq!(seq.pop(), Some(Value::from(3)));
        assert_eq!(watcher.run_count(), 3);
        assert_eq!(numbers(&seq), vec![1.0, 2.0]);
    }

    #[test]
    fn shift_and_unshift_notify() {
        let (seq, watcher) = observed([1, 2]);

        assert_eq!(seq.unshift(0), 3);
        assert_eq!(seq.shift(), Some(Value::from(0)));
        assert_eq!(watcher.run_count(), 3);
        assert_eq!(numbers(&seq), vec![1.0, 2.0]);
    }

    #[test]
    fn splice_replaces_range() {
        let (seq, watcher) = observed([1, 2, 3, 4]);

        let removed = seq.splice(1, 2, [Value::from(9)]);
        assert_eq!(removed, vec![Value::from(2), Value::from(3)]);
        assert_eq!(numbers(&seq), vec![1.0, 9.0, 4.0]);
        assert_eq!(watcher.run_count(), 2);
    }

    #[test]
    fn splice_clamps_out_of_range() {
        let (seq, _watcher) = observed([1, 2]);

        assert!(seq.splice(5, 3, [Value::from(3)]).is_empty());
        assert_eq!(numbers(&seq), vec![1.0, 2.0, 3.0]);
        assert_eq!(seq.splice(1, 10, []), vec![Value::from(2), Value::from(3)]);
    }

    #[test]
    fn reorder_operations_notify() {
        let (seq, watcher) = observed([3, 1, 2]);

        seq.sort_by(|a, b| {
            a.as_number()
                .partial_cmp(&b.as_number())
                .unwrap_or(Ordering::Equal)
        });
        assert_eq!(numbers(&seq), vec![1.0, 2.0, 3.0]);

        seq.reverse();
        assert_eq!(numbers(&seq), vec![3.0, 2.0, 1.0]);
        assert_eq!(watcher.run_count(), 3);
    }

    #[test]
    fn comparator_may_read_the_sequence() {
        let (seq, watcher) = observed([2, 3, 1]);
        let reader = seq.clone();

        seq.sort_by(|a, b| {
            assert_eq!(reader.len(), 3);
            assert!(reader.get(0).is_some());
            a.as_number()
                .partial_cmp(&b.as_number())
                .unwrap_or(Ordering::Equal)
        });

        assert_eq!(numbers(&seq), vec![1.0, 2.0, 3.0]);
        assert_eq!(watcher.run_count(), 2);
    }

    #[test]
    fn non_extensible_sequences_still_mutate() {
        let (seq, watcher) = observed([1, 2]);
        seq.prevent_extensions();

        assert_eq!(seq.push(3), 3);
        assert_eq!(seq.splice(0, 1, [Value::from(0)]), vec![Value::from(1)]);
        assert_eq!(numbers(&seq), vec![0.0, 2.0, 3.0]);
        assert_eq!(watcher.run_count(), 3);
    }

    #[test]
    fn inserted_elements_are_observed() {
        let (seq, _watcher) = observed([]);
        let pushed = Record::from_iter([("a", 1)]);
        let spliced = Record::from_iter([("b", 2)]);

        seq.push(&pushed);
        seq.splice(0, 0, [Value::from(&spliced)]);

        assert!(pushed.is_reactive("a"));
        assert!(spliced.is_reactive("b"));
    }

    #[test]
    fn unobserved_sequences_mutate_quietly() {
        let seq = Sequence::new();
        let record = Record::from_iter([("a", 1)]);
        seq.push(&record);
        assert!(record.observer().is_none());
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn raw_writes_are_not_observable() {
        let (seq, watcher) = observed([1, 2, 3]);
        seq.assign(1, 99);
        seq.set_len(2);
        assert_eq!(numbers(&seq), vec![1.0, 99.0]);
        assert_eq!(watcher.run_count(), 1);
    }

    #[test]
    fn frozen_sequences_reject_mutations() {
        let seq = Sequence::from_iter([1, 2]);
        seq.freeze();

        assert_eq!(seq.push(3), 2);
        assert_eq!(seq.pop(), None);
        assert!(seq.splice(0, 1, []).is_empty());
        assert_eq!(numbers(&seq), vec![1.0, 2.0]);
    }

    #[test]
    fn method_names() {
        let names: Vec<_> = Method::ALL.iter().map(Method::name).collect();
        assert_eq!(
            names,
            ["push", "pop", "shift", "unshift", "splice", "sort", "reverse"]
        );
    }
}
