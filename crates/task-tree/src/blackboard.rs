//! Shared, typed key/value store.
//!
//! The [`Blackboard`] is the only state shared between tasks, and the only
//! structure that crosses thread boundaries: a background worker holds its own
//! clone of the handle and writes progress into it while the driving thread
//! keeps ticking the tree.
//!
//! Every entry is stored type-erased together with the name of the type it was
//! written with. Reads check the requested type at runtime and return
//! [`BlackboardError::TypeMismatch`] instead of reinterpreting the value.
//!
//! # Locking
//!
//! All access goes through one mutex. The convenience methods on
//! [`Blackboard`] lock for a single operation; callers that need several
//! operations to be observed atomically take the lock once with
//! [`Blackboard::lock`] and work on the returned [`Entries`].
//!
//! ```rust
//! use task_tree::Blackboard;
//!
//! let blackboard = Blackboard::new();
//! blackboard.set("files", 0usize);
//!
//! {
//!     let mut entries = blackboard.lock();
//!     let files: usize = entries.get("files").unwrap();
//!     entries.set("files", files + 1);
//!     entries.set("scan.done", true);
//! }
//!
//! assert_eq!(blackboard.get::<usize>("files").unwrap(), 1);
//! ```

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::BlackboardError;

/// Guard returned by [`Blackboard::lock`].
pub type BlackboardGuard<'a> = MutexGuard<'a, Entries>;

struct Entry {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

/// The entries of a blackboard, reachable only while its mutex is held.
#[derive(Default)]
pub struct Entries {
    map: HashMap<String, Entry>,
}

impl Entries {
    /// Returns a clone of the value stored under `key`.
    pub fn get<T: Clone + 'static>(&self, key: &str) -> Result<T, BlackboardError> {
        self.get_ref::<T>(key).cloned()
    }

    /// Borrows the value stored under `key`.
    pub fn get_ref<T: 'static>(&self, key: &str) -> Result<&T, BlackboardError> {
        let entry = self.entry(key)?;
        entry
            .value
            .downcast_ref::<T>()
            .ok_or_else(|| BlackboardError::TypeMismatch {
                key: key.to_owned(),
                expected: type_name::<T>(),
                found: entry.type_name,
            })
    }

    /// Like [`get`](Self::get), but an absent key yields `Ok(None)`.
    ///
    /// A present key holding a different type is still an error.
    pub fn get_opt<T: Clone + 'static>(
        &self,
        key: &str,
    ) -> Result<Option<T>, BlackboardError> {
        if self.map.contains_key(key) {
            self.get(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Stores `value` under `key`, replacing any previous value of any type.
    pub fn set<T: Send + 'static>(&mut self, key: impl Into<String>, value: T) {
        self.map.insert(
            key.into(),
            Entry {
                value: Box::new(value),
                type_name: type_name::<T>(),
            },
        );
    }

    /// Mutates the value stored under `key` in place.
    pub fn update<T, R>(
        &mut self,
        key: &str,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, BlackboardError>
    where
        T: 'static,
    {
        let entry = self
            .map
            .get_mut(key)
            .ok_or_else(|| BlackboardError::KeyNotFound {
                key: key.to_owned(),
            })?;
        let found = entry.type_name;
        let value = entry
            .value
            .downcast_mut::<T>()
            .ok_or_else(|| BlackboardError::TypeMismatch {
                key: key.to_owned(),
                expected: type_name::<T>(),
                found,
            })?;
        Ok(f(value))
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Removes `key`, returning `true` if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.map.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over the stored keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    fn entry(&self, key: &str) -> Result<&Entry, BlackboardError> {
        self.map.get(key).ok_or_else(|| BlackboardError::KeyNotFound {
            key: key.to_owned(),
        })
    }
}

impl fmt::Debug for Entries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.map.iter().map(|(key, entry)| (key, entry.type_name)))
            .finish()
    }
}

/// Handle to a shared blackboard.
///
/// Cloning the handle is cheap and every clone refers to the same entries.
#[derive(Clone, Default)]
pub struct Blackboard {
    entries: Arc<Mutex<Entries>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the blackboard mutex for a compound operation.
    ///
    /// A writer that panicked while holding the lock leaves the entries as
    /// they were at the panic; the poison flag is ignored.
    pub fn lock(&self) -> BlackboardGuard<'_> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get<T: Clone + 'static>(&self, key: &str) -> Result<T, BlackboardError> {
        self.lock().get(key)
    }

    pub fn get_opt<T: Clone + 'static>(
        &self,
        key: &str,
    ) -> Result<Option<T>, BlackboardError> {
        self.lock().get_opt(key)
    }

    pub fn set<T: Send + 'static>(&self, key: impl Into<String>, value: T) {
        self.lock().set(key, value);
    }

    pub fn update<T, R>(
        &self,
        key: &str,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<R, BlackboardError>
    where
        T: 'static,
    {
        self.lock().update(key, f)
    }

    pub fn has(&self, key: &str) -> bool {
        self.lock().has(key)
    }

    pub fn remove(&self, key: &str) -> bool {
        self.lock().remove(key)
    }
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blackboard")
            .field("entries", &*self.lock())
            .finish()
    }
}
