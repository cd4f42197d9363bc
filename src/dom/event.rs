// ============================================================================
// spark-mvvm - DOM Events
// ============================================================================

use std::rc::Rc;

use super::node::Node;

/// Handler registered with `Node::add_event_listener`
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// Identifies one registered listener on one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// A dispatched event
#[derive(Debug, Clone)]
pub struct Event {
    kind: String,
    target: Node,
}

impl Event {
    pub fn new(kind: &str, target: Node) -> Self {
        Self {
            kind: kind.to_string(),
            target,
        }
    }

    /// Event type, e.g. `"input"`
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The node the event was dispatched at
    pub fn target(&self) -> &Node {
        &self.target
    }
}
