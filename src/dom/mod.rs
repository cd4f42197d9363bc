// ============================================================================
// spark-mvvm - DOM Module
// In-memory document the binder reads templates from and writes into
// ============================================================================

pub mod document;
pub mod event;
pub mod html;
pub mod node;
pub mod selector;

// Re-export for convenience
pub use document::Document;
pub use event::{Event, EventHandler, ListenerId};
pub use node::{Attribute, Node, NodeType};
pub use selector::Selector;
