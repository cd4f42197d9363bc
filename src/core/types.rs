// ============================================================================
// spark-mvvm - Type Definitions
// Type-erased subscriber trait for the dependency graph
// ============================================================================

use std::any::Any;

use super::constants::*;
use super::error::Result;
use crate::reactivity::dependency::Dependency;

// =============================================================================
// TYPE-ERASED SUBSCRIBER
// =============================================================================
//
// Dependencies only need to know how to poke a subscriber, never what it
// computes. Storing `Weak<dyn AnySubscriber>` keeps property slots free of
// any knowledge about watchers, bindings or the DOM.
// =============================================================================

/// Something that can be registered in a `Dependency` and notified.
///
/// Implemented by `WatcherInner`.
pub trait AnySubscriber: Any {
    /// Get the flags bitmask
    fn flags(&self) -> u32;

    /// Set the flags bitmask
    fn set_flags(&self, flags: u32);

    /// Record that `dep` was read during the current collection
    fn track(&self, dep: &Dependency);

    /// Re-run after a dependency changed
    fn update(&self) -> Result<()>;

    /// Check if this subscriber is collecting
    fn is_collecting(&self) -> bool {
        self.flags() & COLLECTING != 0
    }

    /// Check if this subscriber is idle
    fn is_idle(&self) -> bool {
        self.flags() & IDLE != 0
    }

    /// Check if this subscriber was disposed
    fn is_disposed(&self) -> bool {
        self.flags() & DISPOSED != 0
    }

    /// Replace the status bits (IDLE / COLLECTING)
    fn set_status(&self, status: u32) {
        let flags = (self.flags() & STATUS_MASK) | status;
        self.set_flags(flags);
    }

    /// Mark as disposed
    fn mark_disposed(&self) {
        self.set_flags(self.flags() | DISPOSED);
    }

    /// Upcast to Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

// =============================================================================
// TESTS
// =============================================================================
