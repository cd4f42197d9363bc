// ============================================================================
// spark-mvvm - A Reactive Data-Binding Runtime for Rust
// ============================================================================
//
// Wraps a plain nested data tree so every property read and write is
// observable, then binds a DOM subtree to it: `{{ path }}` placeholders in
// text and `v-*` attributes on inputs stay in sync with the data, in both
// directions for inputs.
// ============================================================================

mod macros;

pub mod binder;
pub mod core;
pub mod dom;
pub mod reactivity;
pub mod vm;

// Re-export core items at crate root for ergonomic access
pub use core::constants;
pub use core::context::{
    collection_depth, enter_collection, is_collecting, with_context, write_version,
    CollectionGuard, ReactiveContext,
};
pub use core::error::{BindError, Result};
pub use core::types::AnySubscriber;

// Re-export the reactive store
pub use reactivity::dependency::{Dependency, NotifyReport};
pub use reactivity::node::ReactiveNode;
pub use reactivity::path::Path;
pub use reactivity::tracking::{track_read, untrack};
pub use reactivity::value::Value;
pub use reactivity::watcher::{WatchCallback, Watcher, WatcherInner};

// Re-export the DOM and binder
pub use binder::{compile, Binding, BindingKind, DirectiveKind, TemplateBinder, TextTemplate};
pub use dom::{Attribute, Document, Event, ListenerId, Node, NodeType, Selector};
pub use vm::{MountOptions, ViewModel};

// =============================================================================
// TESTS
// =============================================================================
