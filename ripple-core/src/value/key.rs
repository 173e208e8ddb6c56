use std::borrow::Cow;
use std::fmt;

/// A property name or a sequence position.
///
/// Records are keyed by name; an index key used on a record is converted to
/// its decimal name. A name is accepted as a sequence index only when it is
/// the canonical decimal form of a non-negative integer (`"3"`, not `"03"`
/// or `"3.0"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Index(usize),
    Name(String),
}

impl Key {
    /// The sequence position this key denotes, if any.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(name) => {
                let index: usize = name.parse().ok()?;
                (index.to_string() == *name).then_some(index)
            }
        }
    }

    /// The record property name this key denotes.
    pub fn as_name(&self) -> Cow<'_, str> {
        match self {
            Key::Index(i) => Cow::Owned(i.to_string()),
            Key::Name(name) => Cow::Borrowed(name),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        usize::try_from(i).map_or_else(|_| Key::Name(i.to_string()), Key::Index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_owned())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key::Name(name.clone())
    }
}
