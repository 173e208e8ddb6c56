//! Observable Values
//!
//! Everything the observer can see is a [`Value`]. The variant set is
//! closed: primitives, two container kinds, and an opaque marker for output
//! that has already been rendered. Eligibility for observation is a match on
//! the variant, not a runtime check.
//!
//! # Containers
//!
//! [`Record`] and [`Sequence`] are shared handles. Cloning one aliases the
//! same container, and identity equality compares the handles, not the
//! contents. Each container carries the slot its [`Observer`] is stored in
//! once it is observed.
//!
//! # Ingress
//!
//! External data enters through `From<serde_json::Value>`, which builds
//! fresh, unobserved containers.
//!
//! [`Observer`]: crate::observer::Observer

mod key;
mod record;
mod sequence;

use std::fmt;
use std::sync::Arc;

pub use key::Key;
pub use record::{Accessor, Getter, Property, Record, RecordKind, Setter};
pub use sequence::Sequence;

use crate::observer::Observer;

/// A value that can live inside an observed container.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Record(Record),
    Sequence(Sequence),
    Rendered(Rendered),
}

impl Value {
    /// Identity comparison used to decide whether a write changes anything.
    ///
    /// Primitives compare by value with `NaN` equal to itself. Containers
    /// and rendered output compare by identity.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a.ptr_eq(b),
            (Value::Sequence(a), Value::Sequence(b)) => a.ptr_eq(b),
            (Value::Rendered(a), Value::Rendered(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Record(_) => "record",
            Value::Sequence(_) => "sequence",
            Value::Rendered(_) => "rendered",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// The observer attached to this value, if it is an observed container.
    pub fn observer(&self) -> Option<Arc<Observer>> {
        match self {
            Value::Record(r) => r.observer(),
            Value::Sequence(s) => s.observer(),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Record(r) => fmt::Debug::fmt(r, f),
            Value::Sequence(s) => fmt::Debug::fmt(s, f),
            Value::Rendered(r) => fmt::Debug::fmt(r, f),
        }
    }
}

/// Opaque handle for output produced by a rendering layer.
///
/// Rendered output is never observed, even when it is stored inside an
/// observed container.
#[derive(Clone)]
pub struct Rendered(Arc<str>);

impl Rendered {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Arc::from(tag.into()))
    }

    pub fn tag(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rendered({})", self.tag())
    }
}

// ----------------------------------------------------------------------------
// Conversions
// ----------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

impl_from_number!(i32, i64, u32, u64, usize, f32, f64);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<&Record> for Value {
    fn from(r: &Record) -> Self {
        Value::Record(r.clone())
    }
}

impl From<Sequence> for Value {
    fn from(s: Sequence) -> Self {
        Value::Sequence(s)
    }
}

impl From<&Sequence> for Value {
    fn from(s: &Sequence) -> Self {
        Value::Sequence(s.clone())
    }
}

impl From<Rendered> for Value {
    fn from(r: Rendered) -> Self {
        Value::Rendered(r)
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(Sequence::from(items))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Record(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nan_is_same_as_nan() {
        let a = Value::from(f64::NAN);
        assert!(a.same_value(&Value::from(f64::NAN)));
        assert!(!a.same_value(&Value::from(0.0)));
    }

    #[test]
    fn containers_compare_by_identity() {
        let a = Record::new();
        let b = Record::new();
        assert!(Value::from(&a).same_value(&Value::from(a.clone())));
        assert!(!Value::from(&a).same_value(&Value::from(&b)));

        let s = Sequence::new();
        assert_eq!(Value::from(&s), Value::from(s.clone()));
        assert_ne!(Value::from(&s), Value::from(Sequence::new()));
    }

    #[test]
    fn primitives_of_different_kinds_differ() {
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::Null, Value::from(false));
        assert_eq!(Value::from(Option::<i32>::None), Value::Null);
    }

    #[test]
    fn json_ingress_builds_containers() {
        let value = Value::from(json!({
            "name": "ripple",
            "tags": ["a", "b"],
            "nested": { "n": 1.5 },
        }));

        let record = value.as_record().unwrap();
        assert_eq!(record.keys(), vec!["name", "tags", "nested"]);
        assert_eq!(record.get("name"), Some(Value::from("ripple")));

        let tags = record.get("tags").unwrap();
        assert_eq!(tags.as_sequence().unwrap().len(), 2);

        let nested = record.get("nested").unwrap();
        assert_eq!(nested.as_record().unwrap().get("n"), Some(Value::from(1.5)));
        assert!(value.observer().is_none());
    }
}
