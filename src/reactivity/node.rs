// ============================================================================
// spark-mvvm - Reactive Node
// An object whose every property read and write is observable
// ============================================================================
//
// Each own key maps to a slot holding (value, Dependency). Reading a key
// registers the collecting watcher with that slot's dependency; writing a
// different value stores it and notifies the dependency before returning.
// Nested objects are nodes themselves, so reactivity is deep.
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::core::context::with_context;
use crate::core::error::{BindError, Result};
use crate::reactivity::dependency::Dependency;
use crate::reactivity::path::Path;
use crate::reactivity::tracking::track_read;
use crate::reactivity::value::Value;

struct Slot {
    key: String,
    value: Value,
    dep: Dependency,
}

/// A reactive object. Cloning shares the same slots.
///
/// # Example
///
/// ```
/// use spark_mvvm::{ReactiveNode, Value};
/// use serde_json::json;
///
/// let data = ReactiveNode::wrap(json!({ "a": { "b": 1123 }, "c": 2 })).unwrap();
/// assert_eq!(data.get("c"), Value::from(2));
///
/// // Writing the current value is a no-op
/// assert!(!data.set("c", 2));
/// assert!(data.set("c", 3));
/// ```
#[derive(Clone, Default)]
pub struct ReactiveNode {
    inner: Rc<NodeInner>,
}

#[derive(Default)]
struct NodeInner {
    slots: RefCell<Vec<Slot>>,
}

impl ReactiveNode {
    /// Create an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a node from already-converted entries. Later duplicates win.
    pub fn from_entries<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let node = Self::new();
        {
            let mut slots = node.inner.slots.borrow_mut();
            for (key, value) in entries {
                let key = key.into();
                match slots.iter_mut().find(|slot| slot.key == key) {
                    Some(slot) => slot.value = value,
                    None => slots.push(Slot {
                        key,
                        value,
                        dep: Dependency::new(),
                    }),
                }
            }
        }
        node
    }

    /// Deep-wrap a JSON object.
    ///
    /// Fails with `NotAnObject` for anything but an object.
    pub fn wrap(json: serde_json::Value) -> Result<Self> {
        Self::try_from_value(&Value::from(json))
    }

    /// The node behind an object value.
    ///
    /// Wrapping an already-wrapped object is idempotent: the same node comes
    /// back. Leaves fail with `NotAnObject`.
    pub fn try_from_value(value: &Value) -> Result<Self> {
        value.try_object().cloned()
    }

    /// Read a property, registering the collecting watcher (if any).
    ///
    /// Absent keys read as `Undefined` and register nothing.
    pub fn get(&self, key: &str) -> Value {
        let found = {
            let slots = self.inner.slots.borrow();
            slots
                .iter()
                .find(|slot| slot.key == key)
                .map(|slot| (slot.value.clone(), slot.dep.clone()))
        };
        match found {
            Some((value, dep)) => {
                track_read(&dep);
                value
            }
            None => Value::Undefined,
        }
    }

    /// Read a property without registering anything.
    pub fn peek(&self, key: &str) -> Value {
        self.inner
            .slots
            .borrow()
            .iter()
            .find(|slot| slot.key == key)
            .map(|slot| slot.value.clone())
            .unwrap_or_default()
    }

    /// Write a property.
    ///
    /// Returns false, and notifies nobody, when `value` is strictly equal to
    /// the current value. Otherwise stores it and synchronously notifies the
    /// slot's subscribers before returning. Writing an absent key defines a
    /// new slot.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        let dep = {
            let mut slots = self.inner.slots.borrow_mut();
            match slots.iter_mut().find(|slot| slot.key == key) {
                Some(slot) => {
                    if slot.value.strict_eq(&value) {
                        return false;
                    }
                    slot.value = value;
                    Some(slot.dep.clone())
                }
                None => {
                    slots.push(Slot {
                        key: key.to_string(),
                        value,
                        dep: Dependency::new(),
                    });
                    None
                }
            }
        };
        // Borrow on slots is released before anyone gets notified

        let version = with_context(|ctx| ctx.increment_write_version());
        trace!(key, version, "property write");
        if let Some(dep) = dep {
            dep.notify();
        }
        true
    }

    /// Read through a dot-path, registering every segment.
    pub fn get_path(&self, expr: &str) -> Result<Value> {
        Path::parse(expr)?.resolve(self)
    }

    /// Write through a dot-path. Intermediate segments are read untracked.
    pub fn set_path(&self, expr: &str, value: impl Into<Value>) -> Result<bool> {
        Path::parse(expr)?.assign(self, value.into())
    }

    /// Own keys, in definition order
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .slots
            .borrow()
            .iter()
            .map(|slot| slot.key.clone())
            .collect()
    }

    /// Untracked snapshot of (key, value) pairs, in definition order
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.inner
            .slots
            .borrow()
            .iter()
            .map(|slot| (slot.key.clone(), slot.value.clone()))
            .collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.slots.borrow().iter().any(|slot| slot.key == key)
    }

    pub fn len(&self) -> usize {
        self.inner.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.borrow().is_empty()
    }

    /// The dependency owned by `key`'s slot
    pub fn dependency(&self, key: &str) -> Option<Dependency> {
        self.inner
            .slots
            .borrow()
            .iter()
            .find(|slot| slot.key == key)
            .map(|slot| slot.dep.clone())
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &ReactiveNode) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl TryFrom<serde_json::Value> for ReactiveNode {
    type Error = BindError;

    fn try_from(json: serde_json::Value) -> Result<Self> {
        Self::wrap(json)
    }
}

impl fmt::Debug for ReactiveNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only: values may refer back to this node
        f.debug_struct("ReactiveNode")
            .field("keys", &self.keys())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
