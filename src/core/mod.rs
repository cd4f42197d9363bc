// ============================================================================
// spark-mvvm - Core Module
// Fundamental types, traits, errors and context for the reactive system
// ============================================================================

pub mod constants;
pub mod context;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use context::{
    collection_depth, enter_collection, is_collecting, with_context, write_version,
    CollectionGuard, ReactiveContext,
};
pub use error::{BindError, Result};
pub use types::AnySubscriber;
