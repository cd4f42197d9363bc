// ============================================================================
// spark-mvvm - Dependency Tracking
// Registering the collecting watcher on every property read
// ============================================================================
//
// The borrow rule from the rest of the crate applies here too: never hold a
// RefCell borrow of a slot while touching the context or a subscriber.
// Property reads clone the slot's Dependency out first, then call in here.
// ============================================================================

use std::rc::Rc;

use crate::core::context::{enter_collection, with_context};
use crate::reactivity::dependency::Dependency;

// =============================================================================
// TRACK READ - Register dependency when reading a property
// =============================================================================

/// Track a read of a property, registering the innermost collecting
/// subscriber with its dependency.
///
/// Does nothing outside a collection window or inside `untrack`.
pub fn track_read(dep: &Dependency) {
    let Some(subscriber) = with_context(|ctx| ctx.active_collector()) else {
        return;
    };

    dep.add_sub(Rc::downgrade(&subscriber));
    subscriber.track(dep);
}

// =============================================================================
// UNTRACK - Read without creating dependencies
// =============================================================================

/// Run `f` without registering any dependencies, even inside a watcher's
/// evaluation.
///
/// # Example
///
/// ```
/// use spark_mvvm::{untrack, ReactiveNode, Value};
///
/// let data = ReactiveNode::wrap(serde_json::json!({ "c": 2 })).unwrap();
/// let c = untrack(|| data.get("c"));
/// assert_eq!(c, Value::from(2));
/// ```
pub fn untrack<T>(f: impl FnOnce() -> T) -> T {
    let _guard = enter_collection(None);
    f()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::{collection_depth, is_collecting};
    use crate::core::error::Result;
    use crate::core::types::AnySubscriber;
    use std::any::Any;
    use std::cell::{Cell, RefCell};

    struct Collector {
        flags: Cell<u32>,
        seen: RefCell<Vec<Dependency>>,
    }

    impl AnySubscriber for Collector {
        fn flags(&self) -> u32 {
            self.flags.get()
        }

        fn set_flags(&self, flags: u32) {
            self.flags.set(flags);
        }

        fn track(&self, dep: &Dependency) {
            self.seen.borrow_mut().push(dep.clone());
        }

        fn update(&self) -> Result<()> {
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn collector() -> Rc<dyn AnySubscriber> {
        Rc::new(Collector {
            flags: Cell::new(0),
            seen: RefCell::new(Vec::new()),
        })
    }

    fn seen(sub: &Rc<dyn AnySubscriber>) -> usize {
        sub.as_any()
            .downcast_ref::<Collector>()
            .map(|c| c.seen.borrow().len())
            .unwrap_or(0)
    }

    #[test]
    fn read_outside_collection_is_ignored() {
        let dep = Dependency::new();
        track_read(&dep);
        assert_eq!(dep.subscriber_count(), 0);
    }

    #[test]
    fn read_inside_collection_registers_both_sides() {
        let sub = collector();
        let dep = Dependency::new();
        {
            let _guard = enter_collection(Some(Rc::downgrade(&sub)));
            track_read(&dep);
            track_read(&dep);
        }
        assert_eq!(dep.subscriber_count(), 1);
        assert_eq!(seen(&sub), 2);
    }

    #[test]
    fn untrack_suppresses_registration() {
        let sub = collector();
        let dep = Dependency::new();
        let _guard = enter_collection(Some(Rc::downgrade(&sub)));

        untrack(|| {
            assert!(!is_collecting());
            track_read(&dep);
        });

        assert!(is_collecting());
        assert_eq!(dep.subscriber_count(), 0);
        assert_eq!(collection_depth(), 1);
    }
}
