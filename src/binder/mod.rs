// ============================================================================
// spark-mvvm - Template Binder
// Walks a DOM subtree once and wires every bind point to the data tree
// ============================================================================
//
// The root's children are moved into a fragment, bound depth-first, and
// moved back in one append. Two kinds of bind point exist:
//
// - element attributes named `v-*`: the element's value follows the data
//   path, and `input` events write the value back (nested paths included)
// - text nodes containing `{{ path }}`: every placeholder gets its own
//   watcher; any of them changing re-renders the whole text
//
// A bind point that cannot be set up is logged and skipped; the pass goes on.
// ============================================================================

pub mod binding;
pub mod directive;
pub mod interpolate;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::cloned;
use crate::core::constants::INPUT_EVENT;
use crate::dom::{Event, Node, NodeType};
use crate::reactivity::node::ReactiveNode;
use crate::reactivity::path::Path;
use crate::reactivity::value::Value;
use crate::reactivity::watcher::Watcher;

pub use binding::{Binding, BindingKind};
pub use directive::DirectiveKind;
pub use interpolate::{Span, TextTemplate};

/// Binds templates against one data root, accumulating the bindings.
pub struct TemplateBinder {
    data: ReactiveNode,
    bindings: Vec<Binding>,
}

impl TemplateBinder {
    pub fn new(data: &ReactiveNode) -> Self {
        Self {
            data: data.clone(),
            bindings: Vec::new(),
        }
    }

    /// Bind everything under `el` (not `el` itself).
    pub fn bind(&mut self, el: &Node) {
        let fragment = Node::fragment();
        while let Some(child) = el.first_child() {
            fragment.append_child(&child);
        }

        let before = self.bindings.len();
        self.walk(&fragment);
        el.append_child(&fragment);

        debug!(
            root = ?el,
            bindings = self.bindings.len() - before,
            "template bound"
        );
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn into_bindings(self) -> Vec<Binding> {
        self.bindings
    }

    fn walk(&mut self, parent: &Node) {
        for node in parent.child_nodes() {
            match node.node_type() {
                NodeType::Element => self.bind_element(&node),
                NodeType::Text => self.bind_text(&node),
                NodeType::Document | NodeType::Fragment => {}
            }
            if node.has_child_nodes() {
                self.walk(&node);
            }
        }
    }

    fn bind_element(&mut self, node: &Node) {
        for attr in node.attributes() {
            match DirectiveKind::lookup(&attr.name) {
                Some(kind @ DirectiveKind::Model) => self.bind_model(node, kind, &attr.value),
                None => {}
            }
        }
    }

    fn bind_model(&mut self, node: &Node, kind: DirectiveKind, expr: &str) {
        let path = match Path::parse(expr) {
            Ok(path) => path,
            Err(err) => {
                warn!(error = %err, "directive skipped");
                return;
            }
        };

        let (watcher, initial) = Watcher::new(
            &self.data,
            path.clone(),
            cloned!(node => move |value: &Value| node.set_value(&value.to_display_string())),
        );
        match initial {
            Ok(value) => node.set_value(&value.to_display_string()),
            Err(err) => warn!(error = %err, "directive left unrendered"),
        }

        let data = self.data.clone();
        let listener = node.add_event_listener(INPUT_EVENT, move |event: &Event| {
            let value = Value::from(event.target().value());
            if let Err(err) = path.assign(&data, value) {
                warn!(error = %err, "input not written back");
            }
        });

        self.bindings.push(Binding::new(
            node.clone(),
            expr,
            BindingKind::Directive(kind),
            watcher,
            Some(listener),
        ));
    }

    fn bind_text(&mut self, node: &Node) {
        let Some(template) = TextTemplate::parse(&node.text_content()) else {
            return;
        };
        let template = Rc::new(template);
        let values: Rc<RefCell<Vec<Option<String>>>> =
            Rc::new(RefCell::new(vec![None; template.spans().len()]));

        for (index, span) in template.spans().iter().enumerate() {
            let path = match Path::parse(&span.expression) {
                Ok(path) => path,
                Err(err) => {
                    warn!(error = %err, "interpolation skipped");
                    continue;
                }
            };

            let (watcher, initial) = Watcher::new(
                &self.data,
                path,
                cloned!(node, template, values => move |value: &Value| {
                    values.borrow_mut()[index] = Some(value.to_display_string());
                    node.set_text_content(&template.render(&values.borrow()));
                }),
            );
            match initial {
                Ok(value) => values.borrow_mut()[index] = Some(value.to_display_string()),
                Err(err) => warn!(error = %err, "interpolation left unrendered"),
            }

            self.bindings.push(Binding::new(
                node.clone(),
                &span.expression,
                BindingKind::Interpolation { index },
                watcher,
                None,
            ));
        }

        node.set_text_content(&template.render(&values.borrow()));
    }
}

/// Bind the subtree under `el` against `data`.
pub fn compile(el: &Node, data: &ReactiveNode) -> Vec<Binding> {
    let mut binder = TemplateBinder::new(data);
    binder.bind(el);
    binder.into_bindings()
}

// =============================================================================
// TESTS
// =============================================================================
