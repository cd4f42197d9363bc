// ============================================================================
// spark-mvvm - Reactivity Module
// Reactive data tree, dependency tracking and watchers
// ============================================================================

pub mod dependency;
pub mod node;
pub mod path;
pub mod tracking;
pub mod value;
pub mod watcher;

// Re-export main tracking items
pub use dependency::{Dependency, NotifyReport};
pub use node::ReactiveNode;
pub use path::Path;
pub use tracking::{track_read, untrack};
pub use value::Value;
pub use watcher::{WatchCallback, Watcher, WatcherInner};
