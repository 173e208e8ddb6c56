//! Mutation errors.
//!
//! Nothing in the core panics or fails for structural reasons. The strict
//! entry points ([`try_set`](crate::observer::try_set),
//! [`try_delete`](crate::observer::try_delete)) surface these as `Err`; the
//! lenient ones report them as diagnostics and carry on.

use thiserror::Error;

use crate::value::Key;

/// Why a dynamic mutation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The target is null or a primitive.
    #[error("cannot {op} reactive property on a {target} value")]
    InvalidTarget {
        op: &'static str,
        target: &'static str,
    },

    /// Adding a key to a root state holder at runtime.
    #[error(
        "avoid adding reactive property `{key}` to an instance or its root state \
         at runtime; declare it upfront"
    )]
    AddToRoot { key: Key },

    /// Deleting a key from a root state holder.
    #[error("avoid deleting property `{key}` on an instance or its root state; set it to null")]
    DeleteFromRoot { key: Key },

    /// A named key used on a sequence.
    #[error("sequences only accept index keys, got `{key}`")]
    UnsupportedKey { key: Key },

    /// A position past the longest sequence allowed.
    #[error("sequence index {index} is out of range")]
    IndexOutOfRange { index: usize },

    /// A new key on a record that no longer accepts keys.
    #[error("cannot add property `{key}`: the record is not extensible")]
    NotExtensible { key: Key },
}

impl MutationError {
    /// Emit this error as a usage diagnostic if diagnostics are enabled.
    pub(crate) fn report(&self) {
        if crate::config::diagnostics_enabled() {
            tracing::warn!(error = %self, "reactive mutation rejected");
        }
    }
}
