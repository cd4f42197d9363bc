// ============================================================================
// spark-mvvm - Dependency
// Per-property subscriber list
// ============================================================================

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use tracing::{error, trace, warn};

use crate::core::context::with_context;
use crate::core::error::BindError;
use crate::core::types::AnySubscriber;

/// Outcome of a single `Dependency::notify` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    /// Subscribers whose update completed
    pub notified: usize,
    /// Subscribers whose update returned an error or panicked
    pub failed: usize,
}

/// The set of subscribers interested in one property slot.
///
/// Subscribers are held weakly, in registration order, at most once each.
/// Cloning shares the same list.
#[derive(Clone, Default)]
pub struct Dependency {
    inner: Rc<DependencyInner>,
}

#[derive(Default)]
struct DependencyInner {
    subs: RefCell<Vec<Weak<dyn AnySubscriber>>>,
}

fn addr(sub: &Weak<dyn AnySubscriber>) -> *const () {
    Weak::as_ptr(sub) as *const ()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl Dependency {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Returns false if it was already present.
    pub fn add_sub(&self, sub: Weak<dyn AnySubscriber>) -> bool {
        let mut subs = self.inner.subs.borrow_mut();
        let ptr = addr(&sub);
        if subs.iter().any(|existing| addr(existing) == ptr) {
            return false;
        }
        subs.push(sub);
        true
    }

    /// Remove a subscriber by identity. Returns true if it was present.
    pub fn remove_sub(&self, sub: *const ()) -> bool {
        let mut subs = self.inner.subs.borrow_mut();
        let before = subs.len();
        subs.retain(|existing| addr(existing) != sub);
        subs.len() != before
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subs
            .borrow()
            .iter()
            .filter(|sub| sub.strong_count() > 0)
            .count()
    }

    /// Number of entries, dead ones included
    #[cfg(test)]
    pub(crate) fn entry_count(&self) -> usize {
        self.inner.subs.borrow().len()
    }

    /// Check whether two handles share the same subscriber list
    pub fn ptr_eq(&self, other: &Dependency) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Call `update()` on every subscriber, in registration order.
    ///
    /// A subscriber that fails or panics is logged and counted; the rest
    /// still run.
    pub fn notify(&self) -> NotifyReport {
        // Collect first so subscribers may (un)register during the pass
        let subs: Vec<Rc<dyn AnySubscriber>> = {
            let mut list = self.inner.subs.borrow_mut();
            list.retain(|sub| sub.strong_count() > 0);
            list.iter().filter_map(Weak::upgrade).collect()
        };

        let depth = with_context(|ctx| ctx.enter_notify());
        trace!(subscribers = subs.len(), depth, "notify");

        let mut report = NotifyReport::default();
        for sub in subs {
            if sub.is_disposed() {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| sub.update())) {
                Ok(Ok(())) => report.notified += 1,
                Ok(Err(err)) => {
                    report.failed += 1;
                    match err {
                        BindError::PathResolution { .. } => {
                            warn!(error = %err, "watcher update skipped")
                        }
                        _ => error!(error = %err, "subscriber update failed"),
                    }
                }
                Err(payload) => {
                    report.failed += 1;
                    let err = BindError::SubscriberPanicked {
                        message: panic_message(payload.as_ref()),
                    };
                    error!(error = %err, "subscriber update failed");
                }
            }
        }

        with_context(|ctx| ctx.exit_notify());
        report
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::DISPOSED;
    use crate::core::error::Result;
    use std::cell::Cell;

    struct Recorder {
        id: u32,
        flags: Cell<u32>,
        log: Rc<RefCell<Vec<u32>>>,
        fail: Option<&'static str>,
    }

    impl Recorder {
        fn new(id: u32, log: &Rc<RefCell<Vec<u32>>>) -> Rc<Self> {
            Rc::new(Self {
                id,
                flags: Cell::new(0),
                log: log.clone(),
                fail: None,
            })
        }

        fn failing(id: u32, log: &Rc<RefCell<Vec<u32>>>, how: &'static str) -> Rc<Self> {
            Rc::new(Self {
                id,
                flags: Cell::new(0),
                log: log.clone(),
                fail: Some(how),
            })
        }
    }

    impl AnySubscriber for Recorder {
        fn flags(&self) -> u32 {
            self.flags.get()
        }

        fn set_flags(&self, flags: u32) {
            self.flags.set(flags);
        }

        fn track(&self, _dep: &Dependency) {}

        fn update(&self) -> Result<()> {
            match self.fail {
                Some("panic") => panic!("recorder {} exploded", self.id),
                Some(_) => Err(BindError::PathResolution {
                    path: "x.y".into(),
                    segment: "x".into(),
                }),
                None => {
                    self.log.borrow_mut().push(self.id);
                    Ok(())
                }
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn weak(sub: &Rc<Recorder>) -> Weak<dyn AnySubscriber> {
        let rc: Rc<dyn AnySubscriber> = sub.clone();
        Rc::downgrade(&rc)
    }

    #[test]
    fn notifies_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Recorder::new(1, &log);
        let b = Recorder::new(2, &log);
        let c = Recorder::new(3, &log);

        let dep = Dependency::new();
        dep.add_sub(weak(&b));
        dep.add_sub(weak(&a));
        dep.add_sub(weak(&c));

        let report = dep.notify();
        assert_eq!(*log.borrow(), vec![2, 1, 3]);
        assert_eq!(report.notified, 3);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn add_sub_deduplicates() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Recorder::new(1, &log);
        let dep = Dependency::new();

        assert!(dep.add_sub(weak(&a)));
        assert!(!dep.add_sub(weak(&a)));
        assert_eq!(dep.subscriber_count(), 1);

        dep.notify();
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn remove_sub_by_identity() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Recorder::new(1, &log);
        let b = Recorder::new(2, &log);
        let dep = Dependency::new();
        dep.add_sub(weak(&a));
        dep.add_sub(weak(&b));

        assert!(dep.remove_sub(Rc::as_ptr(&a) as *const ()));
        assert!(!dep.remove_sub(Rc::as_ptr(&a) as *const ()));

        dep.notify();
        assert_eq!(*log.borrow(), vec![2]);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let dep = Dependency::new();
        {
            let a = Recorder::new(1, &log);
            dep.add_sub(weak(&a));
            assert_eq!(dep.subscriber_count(), 1);
        }
        assert_eq!(dep.subscriber_count(), 0);
        assert_eq!(dep.notify(), NotifyReport::default());
    }

    #[test]
    fn failures_are_isolated() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Recorder::new(1, &log);
        let boom = Recorder::failing(2, &log, "panic");
        let stale = Recorder::failing(3, &log, "error");
        let d = Recorder::new(4, &log);

        let dep = Dependency::new();
        for sub in [&a, &boom, &stale, &d] {
            dep.add_sub(weak(sub));
        }

        let report = dep.notify();
        assert_eq!(*log.borrow(), vec![1, 4]);
        assert_eq!(report.notified, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(with_context(|ctx| ctx.get_notify_depth()), 0);
    }

    #[test]
    fn disposed_subscribers_are_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = Recorder::new(1, &log);
        a.flags.set(DISPOSED);
        let dep = Dependency::new();
        dep.add_sub(weak(&a));

        assert_eq!(dep.notify().notified, 0);
        assert!(log.borrow().is_empty());
    }
}
