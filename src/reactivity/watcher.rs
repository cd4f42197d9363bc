// ============================================================================
// spark-mvvm - Watcher
// A callback bound to a data path, re-run when anything on the path changes
// ============================================================================
//
// Every evaluation (the initial one and each update) runs in COLLECTING
// state: each segment read registers this watcher with that segment's
// dependency. Dependencies read last time but not this time are dropped,
// so replacing `a` with a new object moves the `a.b` subscription over to
// the new node instead of leaving it on the detached one.
// ============================================================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use crate::core::constants::*;
use crate::core::context::enter_collection;
use crate::core::error::Result;
use crate::core::types::AnySubscriber;
use crate::reactivity::dependency::Dependency;
use crate::reactivity::node::ReactiveNode;
use crate::reactivity::path::Path;
use crate::reactivity::value::Value;

/// Callback invoked with the freshly evaluated value
pub type WatchCallback = Box<dyn FnMut(&Value)>;

// =============================================================================
// WATCHER INNER
// =============================================================================

/// The inner watcher implementation, registered (weakly) in dependencies.
pub struct WatcherInner {
    /// Flags bitmask (IDLE / COLLECTING / DISPOSED / WATCHER_RAN)
    flags: Cell<u32>,

    /// Data root the path is evaluated against
    root: ReactiveNode,

    path: Path,

    /// Taken out while running; a re-entrant update sets PENDING instead
    callback: RefCell<Option<WatchCallback>>,

    /// Dependencies registered by the last completed evaluation
    deps: RefCell<Vec<Dependency>>,

    /// Dependencies registered by the evaluation in progress
    new_deps: RefCell<Vec<Dependency>>,

    /// Number of completed evaluations
    runs: Cell<u32>,

    self_weak: Weak<WatcherInner>,
}

impl WatcherInner {
    fn as_weak_subscriber(&self) -> Weak<dyn AnySubscriber> {
        self.self_weak.clone()
    }

    fn self_ptr(&self) -> *const () {
        self as *const Self as *const ()
    }

    /// Evaluate the path while collecting, then reconcile subscriptions.
    fn evaluate(&self) -> Result<Value> {
        self.new_deps.borrow_mut().clear();
        self.set_status(COLLECTING);

        let result = {
            let _guard = enter_collection(Some(self.as_weak_subscriber()));
            self.path.resolve(&self.root)
        };

        self.set_status(IDLE);
        self.set_flags(self.flags() | WATCHER_RAN);
        self.runs.set(self.runs.get() + 1);
        self.reconcile_deps();
        result
    }

    /// Unsubscribe from dependencies the latest evaluation no longer touched.
    fn reconcile_deps(&self) {
        let fresh = self.new_deps.take();
        let stale: Vec<Dependency> = self
            .deps
            .borrow()
            .iter()
            .filter(|old| !fresh.iter().any(|dep| dep.ptr_eq(old)))
            .cloned()
            .collect();

        let me = self.self_ptr();
        for dep in &stale {
            dep.remove_sub(me);
        }
        *self.deps.borrow_mut() = fresh;
    }

    fn run_callback(&self, value: &Value) {
        let Some(callback) = self.callback.borrow_mut().take() else {
            // The running callback picks this up once it returns
            self.set_flags(self.flags() | PENDING);
            trace!(path = %self.path, "re-entrant update deferred");
            return;
        };

        // Put the callback back even if it panics, unless it disposed us
        struct Restore<'a> {
            watcher: &'a WatcherInner,
            callback: Option<WatchCallback>,
        }

        impl Drop for Restore<'_> {
            fn drop(&mut self) {
                if !self.watcher.is_disposed() {
                    *self.watcher.callback.borrow_mut() = self.callback.take();
                }
            }
        }

        let mut restore = Restore {
            watcher: self,
            callback: Some(callback),
        };
        let mut value = value.clone();
        let mut reruns = 0;
        loop {
            if let Some(callback) = restore.callback.as_mut() {
                callback(&value);
            }

            let flags = self.flags();
            if flags & PENDING == 0 || self.is_disposed() {
                break;
            }
            self.set_flags(flags & !PENDING);

            reruns += 1;
            if reruns > MAX_RERUNS {
                warn!(
                    path = %self.path,
                    reruns,
                    "watcher keeps writing its own path, giving up"
                );
                break;
            }
            match self.evaluate() {
                Ok(next) => value = next,
                Err(err) => {
                    warn!(error = %err, "watcher update skipped");
                    break;
                }
            }
        }
    }

    fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        self.mark_disposed();
        let me = self.self_ptr();
        for dep in self.deps.take() {
            dep.remove_sub(me);
        }
        self.callback.borrow_mut().take();
    }
}

impl AnySubscriber for WatcherInner {
    fn flags(&self) -> u32 {
        self.flags.get()
    }

    fn set_flags(&self, flags: u32) {
        self.flags.set(flags);
    }

    fn track(&self, dep: &Dependency) {
        let mut new_deps = self.new_deps.borrow_mut();
        if !new_deps.iter().any(|existing| existing.ptr_eq(dep)) {
            new_deps.push(dep.clone());
        }
    }

    fn update(&self) -> Result<()> {
        if self.is_disposed() {
            return Ok(());
        }
        let value = self.evaluate()?;
        self.run_callback(&value);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// WATCHER - The public handle
// =============================================================================

/// Handle to a watcher. Dropping the last handle disposes it; `dispose`
/// stops it while handles are still around.
#[derive(Clone)]
pub struct Watcher {
    inner: Rc<WatcherInner>,
}

impl Watcher {
    /// Create a watcher and evaluate it once.
    ///
    /// Returns the handle together with the initial evaluation. A failed
    /// initial evaluation still yields a live watcher: it stays subscribed to
    /// the segments it could reach and resolves once they change.
    pub fn new(
        root: &ReactiveNode,
        path: Path,
        callback: impl FnMut(&Value) + 'static,
    ) -> (Self, Result<Value>) {
        let inner = Rc::new_cyclic(|self_weak| WatcherInner {
            flags: Cell::new(IDLE),
            root: root.clone(),
            path,
            callback: RefCell::new(Some(Box::new(callback))),
            deps: RefCell::new(Vec::new()),
            new_deps: RefCell::new(Vec::new()),
            runs: Cell::new(0),
            self_weak: self_weak.clone(),
        });

        let initial = inner.evaluate();
        (Self { inner }, initial)
    }

    /// Parse `expr` and watch it. Initial resolution failures are logged.
    ///
    /// # Example
    ///
    /// ```
    /// use spark_mvvm::{ReactiveNode, Watcher};
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    ///
    /// let data = ReactiveNode::wrap(serde_json::json!({ "a": { "b": 1 } })).unwrap();
    /// let seen = Rc::new(RefCell::new(Vec::new()));
    /// let s = seen.clone();
    /// let _w = Watcher::watch(&data, "a.b", move |v| s.borrow_mut().push(v.to_string())).unwrap();
    ///
    /// data.set_path("a.b", 42).unwrap();
    /// assert_eq!(*seen.borrow(), vec!["42"]);
    /// ```
    pub fn watch(
        root: &ReactiveNode,
        expr: &str,
        callback: impl FnMut(&Value) + 'static,
    ) -> Result<Self> {
        let path = Path::parse(expr)?;
        let (watcher, initial) = Self::new(root, path, callback);
        if let Err(err) = initial {
            warn!(error = %err, "watcher created on unresolved path");
        }
        Ok(watcher)
    }

    /// Re-evaluate and run the callback, as a notification would.
    pub fn update(&self) -> Result<()> {
        self.inner.update()
    }

    /// Evaluate the path without subscribing or running the callback.
    pub fn value(&self) -> Result<Value> {
        crate::reactivity::tracking::untrack(|| self.inner.path.resolve(&self.inner.root))
    }

    /// Unsubscribe from every dependency and drop the callback.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn flags(&self) -> u32 {
        self.inner.flags()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Number of dependencies currently subscribed to
    pub fn dep_count(&self) -> usize {
        self.inner.deps.borrow().len()
    }

    /// Number of completed evaluations
    pub fn runs(&self) -> u32 {
        self.inner.runs.get()
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        // Last handle gone: leave every dependency list now, not on its next write
        if Rc::strong_count(&self.inner) == 1 {
            self.inner.dispose();
        }
    }
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("path", &self.inner.path.as_str())
            .field("deps", &self.dep_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
