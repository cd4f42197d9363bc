// ============================================================================
// spark-mvvm - Reactive Context
// Thread-local state for tracking which watcher is collecting dependencies
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::types::AnySubscriber;

// =============================================================================
// REACTIVE CONTEXT
// =============================================================================

/// Thread-local reactive context holding all global state for reactivity.
///
/// Dependency collection uses a stack rather than a single "current watcher"
/// slot: a watcher created (or re-evaluated) while another one is collecting
/// pushes itself on top and pops on exit, leaving the outer collection intact.
/// A `None` entry marks an untracked region.
pub struct ReactiveContext {
    // =========================================================================
    // COLLECTION
    // =========================================================================
    /// Collecting subscribers, innermost last
    collectors: RefCell<Vec<Option<Weak<dyn AnySubscriber>>>>,

    // =========================================================================
    // VERSION COUNTERS
    // =========================================================================
    /// Global write version - incremented on every effective property write
    write_version: Cell<u32>,

    /// Current notification nesting (a write inside a callback nests)
    notify_depth: Cell<u32>,
}

impl ReactiveContext {
    /// Create a new reactive context with default values
    pub fn new() -> Self {
        Self {
            collectors: RefCell::new(Vec::new()),
            write_version: Cell::new(1),
            notify_depth: Cell::new(0),
        }
    }

    // =========================================================================
    // COLLECTION
    // =========================================================================

    /// Push a collector (or an untracked marker) onto the stack
    pub fn push_collector(&self, collector: Option<Weak<dyn AnySubscriber>>) {
        self.collectors.borrow_mut().push(collector);
    }

    /// Pop the innermost collector
    pub fn pop_collector(&self) -> Option<Option<Weak<dyn AnySubscriber>>> {
        self.collectors.borrow_mut().pop()
    }

    /// The innermost live collector, if the top of the stack is tracking
    pub fn active_collector(&self) -> Option<Rc<dyn AnySubscriber>> {
        self.collectors
            .borrow()
            .last()
            .and_then(|top| top.as_ref())
            .and_then(Weak::upgrade)
    }

    /// Check if reads are currently being collected
    pub fn is_collecting(&self) -> bool {
        matches!(self.collectors.borrow().last(), Some(Some(_)))
    }

    /// Number of entries on the collection stack
    pub fn collection_depth(&self) -> usize {
        self.collectors.borrow().len()
    }

    // =========================================================================
    // VERSION COUNTERS
    // =========================================================================

    /// Increment and return the write version
    pub fn increment_write_version(&self) -> u32 {
        let v = self.write_version.get().wrapping_add(1);
        self.write_version.set(v);
        v
    }

    /// Get the current write version
    pub fn get_write_version(&self) -> u32 {
        self.write_version.get()
    }

    /// Enter a notify pass, returns the new depth
    pub fn enter_notify(&self) -> u32 {
        let depth = self.notify_depth.get() + 1;
        self.notify_depth.set(depth);
        depth
    }

    /// Leave a notify pass, returns the new depth
    pub fn exit_notify(&self) -> u32 {
        let depth = self.notify_depth.get().saturating_sub(1);
        self.notify_depth.set(depth);
        depth
    }

    /// Get current notify depth
    pub fn get_notify_depth(&self) -> u32 {
        self.notify_depth.get()
    }
}

impl Default for ReactiveContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// THREAD-LOCAL ACCESS
// =============================================================================

thread_local! {
    /// The thread-local reactive context
    static CONTEXT: ReactiveContext = ReactiveContext::new();
}

/// Access the thread-local reactive context.
///
/// # Example
///
/// ```ignore
/// with_context(|ctx| {
///     ctx.increment_write_version();
/// });
/// ```
pub fn with_context<R>(f: impl FnOnce(&ReactiveContext) -> R) -> R {
    CONTEXT.with(f)
}

// =============================================================================
// COLLECTION GUARD
// =============================================================================

/// Pops the collection stack when dropped, including during unwinding.
#[must_use = "collection ends as soon as the guard is dropped"]
pub struct CollectionGuard {
    depth: usize,
}

impl Drop for CollectionGuard {
    fn drop(&mut self) {
        with_context(|ctx| {
            debug_assert_eq!(ctx.collection_depth(), self.depth);
            ctx.pop_collector();
        });
    }
}

/// Push `collector` onto the collection stack until the guard drops.
///
/// `None` opens an untracked region.
pub fn enter_collection(collector: Option<Weak<dyn AnySubscriber>>) -> CollectionGuard {
    let depth = with_context(|ctx| {
        ctx.push_collector(collector);
        ctx.collection_depth()
    });
    CollectionGuard { depth }
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Check if reads are currently registering dependencies
pub fn is_collecting() -> bool {
    with_context(|ctx| ctx.is_collecting())
}

/// Get the current collection stack depth
pub fn collection_depth() -> usize {
    with_context(|ctx| ctx.collection_depth())
}

/// Get the current write version
pub fn write_version() -> u32 {
    with_context(|ctx| ctx.get_write_version())
}

// =============================================================================
// TESTS
// =============================================================================
