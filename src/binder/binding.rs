// ============================================================================
// spark-mvvm - Binding
// One bind point: a DOM node, its expression, a watcher and maybe a listener
// ============================================================================

use std::cell::Cell;
use std::fmt;

use crate::dom::{ListenerId, Node};
use crate::reactivity::watcher::Watcher;

use super::directive::DirectiveKind;

/// Where a binding came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// A `v-*` attribute on an element
    Directive(DirectiveKind),
    /// Placeholder number `index` of a text node
    Interpolation { index: usize },
}

/// A live connection between a data path and a DOM node.
///
/// Disposing removes the watcher's subscriptions and the DOM listener.
/// Dropping disposes.
pub struct Binding {
    node: Node,
    expression: String,
    kind: BindingKind,
    watcher: Watcher,
    listener: Option<ListenerId>,
    disposed: Cell<bool>,
}

impl Binding {
    pub(crate) fn new(
        node: Node,
        expression: &str,
        kind: BindingKind,
        watcher: Watcher,
        listener: Option<ListenerId>,
    ) -> Self {
        Self {
            node,
            expression: expression.to_string(),
            kind,
            watcher,
            listener,
            disposed: Cell::new(false),
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    pub fn watcher(&self) -> &Watcher {
        &self.watcher
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some() && !self.disposed.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Tear down. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.watcher.dispose();
        if let Some(id) = self.listener {
            self.node.remove_event_listener(id);
        }
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("node", &self.node)
            .field("expression", &self.expression)
            .field("kind", &self.kind)
            .field("disposed", &self.disposed.get())
            .finish()
    }
}
