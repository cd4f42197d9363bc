// ============================================================================
// spark-mvvm - DOM Node
// An in-memory node tree with just the surface the binder needs
// ============================================================================
//
// Children are held strongly, parents weakly. Moving a node (append_child on
// a node that already has a parent) detaches it first, and appending a
// fragment moves the fragment's children instead of the fragment itself,
// matching how a browser DOM behaves.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::event::{Event, EventHandler, ListenerId};

/// DOM node kinds, numbered like `Node.nodeType`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Document = 9,
    Fragment = 11,
}

/// An element attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

struct Listener {
    id: ListenerId,
    event: String,
    handler: EventHandler,
}

struct NodeInner {
    node_type: NodeType,
    /// Lowercase tag name for elements, empty otherwise
    tag: String,
    /// Character data for text nodes
    data: RefCell<String>,
    attributes: RefCell<Vec<Attribute>>,
    /// The `value` property of form controls
    value: RefCell<String>,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<Node>>,
    listeners: RefCell<Vec<Listener>>,
    next_listener: Cell<u64>,
}

/// Shared handle to a DOM node. Cloning does not copy the node.
#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

impl Node {
    fn with_type(node_type: NodeType, tag: &str, data: &str) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                node_type,
                tag: tag.to_ascii_lowercase(),
                data: RefCell::new(data.to_string()),
                attributes: RefCell::new(Vec::new()),
                value: RefCell::new(String::new()),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(1),
            }),
        }
    }

    /// Create a detached element
    pub fn element(tag: &str) -> Self {
        Self::with_type(NodeType::Element, tag, "")
    }

    /// Create a detached text node
    pub fn text(data: &str) -> Self {
        Self::with_type(NodeType::Text, "", data)
    }

    /// Create an empty document fragment
    pub fn fragment() -> Self {
        Self::with_type(NodeType::Fragment, "", "")
    }

    pub(crate) fn document_root() -> Self {
        Self::with_type(NodeType::Document, "", "")
    }

    pub fn node_type(&self) -> NodeType {
        self.inner.node_type
    }

    pub fn is_element(&self) -> bool {
        self.inner.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.inner.node_type == NodeType::Text
    }

    /// Lowercase tag name; empty for non-elements
    pub fn tag_name(&self) -> &str {
        &self.inner.tag
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // TREE
    // =========================================================================

    pub fn parent(&self) -> Option<Node> {
        self.inner
            .parent
            .borrow()
            .upgrade()
            .map(|inner| Node { inner })
    }

    pub fn first_child(&self) -> Option<Node> {
        self.inner.children.borrow().first().cloned()
    }

    /// Snapshot of the children; safe to iterate while mutating the tree
    pub fn child_nodes(&self) -> Vec<Node> {
        self.inner.children.borrow().clone()
    }

    pub fn has_child_nodes(&self) -> bool {
        !self.inner.children.borrow().is_empty()
    }

    /// Append `child`, detaching it from its current parent first.
    ///
    /// Appending a fragment moves all of its children instead.
    pub fn append_child(&self, child: &Node) {
        if child.node_type() == NodeType::Fragment {
            for grandchild in child.child_nodes() {
                self.append_child(&grandchild);
            }
            return;
        }

        if let Some(old_parent) = child.parent() {
            old_parent.remove_child(child);
        }
        *child.inner.parent.borrow_mut() = Rc::downgrade(&self.inner);
        self.inner.children.borrow_mut().push(child.clone());
    }

    /// Detach `child`. Returns it if it was a child of this node.
    pub fn remove_child(&self, child: &Node) -> Option<Node> {
        let removed = {
            let mut children = self.inner.children.borrow_mut();
            let index = children.iter().position(|c| c.ptr_eq(child))?;
            children.remove(index)
        };
        *removed.inner.parent.borrow_mut() = Weak::new();
        Some(removed)
    }

    /// Depth-first descendants (excluding self), in document order
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        let mut stack: Vec<Node> = self.child_nodes().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.child_nodes().into_iter().rev());
            out.push(node);
        }
        out
    }

    // =========================================================================
    // CONTENT
    // =========================================================================

    /// Text of a text node, or the concatenated text of all descendants
    pub fn text_content(&self) -> String {
        match self.node_type() {
            NodeType::Text => self.inner.data.borrow().clone(),
            _ => self
                .descendants()
                .iter()
                .filter(|n| n.is_text())
                .map(|n| n.inner.data.borrow().clone())
                .collect(),
        }
    }

    /// Replace a text node's data, or all children with a single text node
    pub fn set_text_content(&self, text: &str) {
        match self.node_type() {
            NodeType::Text => *self.inner.data.borrow_mut() = text.to_string(),
            _ => {
                for child in self.child_nodes() {
                    self.remove_child(&child);
                }
                if !text.is_empty() {
                    self.append_child(&Node::text(text));
                }
            }
        }
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        self.inner.attributes.borrow().clone()
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.inner
            .attributes
            .borrow()
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.clone())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    /// Set (or add) an attribute. Names are lowercased.
    pub fn set_attribute(&self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let mut attributes = self.inner.attributes.borrow_mut();
        match attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => attributes.push(Attribute {
                name,
                value: value.to_string(),
            }),
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        let name = name.to_ascii_lowercase();
        self.inner
            .attributes
            .borrow_mut()
            .retain(|attr| attr.name != name);
    }

    /// The live `value` property (what an input displays)
    pub fn value(&self) -> String {
        self.inner.value.borrow().clone()
    }

    pub fn set_value(&self, value: &str) {
        *self.inner.value.borrow_mut() = value.to_string();
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Register `handler` for events of type `event`.
    pub fn add_event_listener(
        &self,
        event: &str,
        handler: impl Fn(&Event) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push(Listener {
            id,
            event: event.to_string(),
            handler: Rc::new(handler),
        });
        id
    }

    /// Remove a listener. Returns false if it was not registered here.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|listener| listener.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Fire `event` at this node. Returns the number of handlers run.
    pub fn dispatch_event(&self, event: &str) -> usize {
        // Collect first: handlers may add or remove listeners
        let handlers: Vec<EventHandler> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|listener| listener.event == event)
            .map(|listener| listener.handler.clone())
            .collect();

        let ev = Event::new(event, self.clone());
        for handler in &handlers {
            handler(&ev);
        }
        handlers.len()
    }

    /// What a keystroke does: set the value, then fire `input`.
    pub fn simulate_input(&self, value: &str) -> usize {
        self.set_value(value);
        self.dispatch_event(crate::core::constants::INPUT_EVENT)
    }

    // =========================================================================
    // SERIALIZATION
    // =========================================================================

    /// Serialize this node (outer HTML; inner HTML for fragments/documents)
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        super::html::serialize(self, &mut out);
        out
    }

    /// Serialize the children only
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.child_nodes() {
            super::html::serialize(&child, &mut out);
        }
        out
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node_type() {
            NodeType::Element => write!(f, "<{}>", self.tag_name()),
            NodeType::Text => write!(f, "#text({:?})", self.inner.data.borrow()),
            NodeType::Document => write!(f, "#document"),
            NodeType::Fragment => write!(f, "#fragment"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_moves_between_parents() {
        let a = Node::element("div");
        let b = Node::element("div");
        let child = Node::text("x");

        a.append_child(&child);
        b.append_child(&child);

        assert!(!a.has_child_nodes());
        assert!(child.parent().unwrap().ptr_eq(&b));
    }

    #[test]
    fn appending_a_fragment_moves_its_children() {
        let frag = Node::fragment();
        frag.append_child(&Node::text("one"));
        frag.append_child(&Node::element("span"));

        let host = Node::element("div");
        host.append_child(&frag);

        assert!(!frag.has_child_nodes());
        assert_eq!(host.child_nodes().len(), 2);
        assert!(host.first_child().unwrap().parent().unwrap().ptr_eq(&host));
    }

    #[test]
    fn text_content_concatenates() {
        let div = Node::element("DIV");
        let span = Node::element("span");
        span.append_child(&Node::text("b"));
        div.append_child(&Node::text("a"));
        div.append_child(&span);

        assert_eq!(div.tag_name(), "div");
        assert_eq!(div.text_content(), "ab");

        div.set_text_content("z");
        assert_eq!(div.child_nodes().len(), 1);
        assert_eq!(div.text_content(), "z");
    }

    #[test]
    fn attributes_are_case_insensitive() {
        let input = Node::element("input");
        input.set_attribute("V-Model", "c");
        assert_eq!(input.get_attribute("v-model").as_deref(), Some("c"));

        input.set_attribute("v-model", "a.b");
        assert_eq!(input.attributes().len(), 1);

        input.remove_attribute("v-model");
        assert!(!input.has_attribute("v-model"));
    }

    #[test]
    fn listeners_fire_and_detach() {
        let input = Node::element("input");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let id = input.add_event_listener("input", move |ev| {
            s.borrow_mut().push(ev.target().value());
        });

        assert_eq!(input.simulate_input("9"), 1);
        assert_eq!(*seen.borrow(), vec!["9"]);
        assert_eq!(input.dispatch_event("change"), 0);

        assert!(input.remove_event_listener(id));
        assert!(!input.remove_event_listener(id));
        assert_eq!(input.simulate_input("10"), 0);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(input.value(), "10");
    }

    #[test]
    fn descendants_in_document_order() {
        let root = Node::element("div");
        let p = Node::element("p");
        p.append_child(&Node::text("1"));
        root.append_child(&p);
        root.append_child(&Node::text("2"));

        let order: Vec<String> = root.descendants().iter().map(|n| format!("{n:?}")).collect();
        assert_eq!(order, vec!["<p>", "#text(\"1\")", "#text(\"2\")"]);
    }
}
