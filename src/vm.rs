// ============================================================================
// spark-mvvm - ViewModel
// The facade callers mount, read and write through
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;

use tracing::debug;

use crate::binder::{self, Binding};
use crate::core::error::{BindError, Result};
use crate::dom::{Document, Node};
use crate::reactivity::node::ReactiveNode;
use crate::reactivity::value::Value;

/// Everything `ViewModel::mount` accepts.
#[derive(Debug, Clone)]
pub struct MountOptions {
    /// Selector of the element whose subtree gets bound
    pub el: String,
    /// The data tree; must be an object
    pub data: Value,
}

impl MountOptions {
    pub fn new(el: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            el: el.into(),
            data: data.into(),
        }
    }
}

/// A mounted view: reactive data plus the bindings into one DOM subtree.
///
/// Top-level keys are read and written with `get` / `set`; anything deeper
/// is reached through `get_path` / `set_path` or by dotting through the
/// returned objects.
///
/// # Example
///
/// ```
/// use spark_mvvm::{Document, MountOptions, ViewModel, Value};
/// use serde_json::json;
///
/// let doc = Document::parse(r#"<div id="app"><p>{{a.b}}</p><input v-model="c"></div>"#).unwrap();
/// let data = json!({ "a": { "b": 1123 }, "c": 2 });
/// let vm = ViewModel::mount(&doc, MountOptions::new("#app", data)).unwrap();
///
/// let p = doc.query_selector("p").unwrap().unwrap();
/// assert_eq!(p.text_content(), "1123");
///
/// vm.set_path("a.b", 42).unwrap();
/// assert_eq!(p.text_content(), "42");
///
/// let input = doc.query_selector("input").unwrap().unwrap();
/// input.simulate_input("9");
/// assert_eq!(vm.get("c"), Value::from("9"));
/// ```
pub struct ViewModel {
    data: ReactiveNode,
    el: Node,
    bindings: RefCell<Vec<Binding>>,
    mounted: Cell<bool>,
}

impl ViewModel {
    /// Wrap `options.data`, find `options.el` in `document` and bind it.
    ///
    /// Fails with `NotAnObject` if the data is not an object,
    /// `InvalidSelector` if the selector cannot be parsed, and
    /// `ElementNotFound` if it matches nothing.
    pub fn mount(document: &Document, options: MountOptions) -> Result<Self> {
        let data = ReactiveNode::try_from_value(&options.data)?;
        let el = document
            .query_selector(&options.el)?
            .ok_or_else(|| BindError::ElementNotFound {
                selector: options.el.clone(),
            })?;

        let bindings = binder::compile(&el, &data);
        debug!(
            el = %options.el,
            keys = data.len(),
            bindings = bindings.len(),
            "view model mounted"
        );

        Ok(Self {
            data,
            el,
            bindings: RefCell::new(bindings),
            mounted: Cell::new(true),
        })
    }

    /// Read a top-level property (tracked).
    pub fn get(&self, key: &str) -> Value {
        self.data.get(key)
    }

    /// Write a top-level property. Returns false if nothing changed.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        self.data.set(key, value)
    }

    /// Read through a dot-path.
    pub fn get_path(&self, expr: &str) -> Result<Value> {
        self.data.get_path(expr)
    }

    /// Write through a dot-path.
    pub fn set_path(&self, expr: &str, value: impl Into<Value>) -> Result<bool> {
        self.data.set_path(expr, value)
    }

    /// The reactive data root
    pub fn data(&self) -> &ReactiveNode {
        &self.data
    }

    /// The mounted element
    pub fn el(&self) -> &Node {
        &self.el
    }

    /// Number of live bindings
    pub fn binding_count(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Dispose every binding. The DOM keeps its last rendered content.
    ///
    /// Calling it again does nothing.
    pub fn unmount(&self) {
        if !self.mounted.replace(false) {
            return;
        }
        let bindings = self.bindings.take();
        for binding in &bindings {
            binding.dispose();
        }
        debug!(bindings = bindings.len(), "view model unmounted");
    }
}

impl Drop for ViewModel {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("el", &self.el)
            .field("data", &self.data)
            .field("bindings", &self.binding_count())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAGE: &str = r#"<div id="app"><p>{{a.b}}</p><input v-model="c"></div>"#;

    fn mount() -> (Document, ViewModel) {
        let doc = Document::parse(PAGE).unwrap();
        let vm = ViewModel::mount(
            &doc,
            MountOptions::new("#app", json!({"a": {"b": 1123}, "c": 2})),
        )
        .unwrap();
        (doc, vm)
    }

    #[test]
    fn top_level_access_delegates_to_data() {
        let (_doc, vm) = mount();
        assert_eq!(vm.get("c"), Value::from(2));
        assert!(vm.get("a").is_object());
        assert!(vm.get("a.b").is_undefined());

        assert!(vm.set("c", 3));
        assert_eq!(vm.data().peek("c"), Value::from(3));
        assert_eq!(vm.binding_count(), 2);
        assert!(vm.is_mounted());
    }

    #[test]
    fn missing_element_is_reported() {
        let doc = Document::parse(PAGE).unwrap();
        let err = ViewModel::mount(&doc, MountOptions::new("#nope", json!({}))).unwrap_err();
        assert_eq!(
            err,
            BindError::ElementNotFound {
                selector: "#nope".into()
            }
        );
    }

    #[test]
    fn data_must_be_an_object() {
        let doc = Document::parse(PAGE).unwrap();
        let err = ViewModel::mount(&doc, MountOptions::new("#app", 5)).unwrap_err();
        assert!(matches!(err, BindError::NotAnObject { .. }));
        // Nothing was bound
        assert_eq!(doc.query_selector("p").unwrap().unwrap().text_content(), "{{a.b}}");
    }

    #[test]
    fn unmount_tears_down_but_keeps_dom() {
        let (doc, vm) = mount();
        let p = doc.query_selector("p").unwrap().unwrap();
        let input = doc.query_selector("input").unwrap().unwrap();

        vm.unmount();
        vm.unmount();
        assert!(!vm.is_mounted());
        assert_eq!(vm.binding_count(), 0);
        assert_eq!(input.listener_count(), 0);

        vm.set_path("a.b", 7).unwrap();
        assert_eq!(p.text_content(), "1123");
    }

    #[test]
    fn drop_unmounts() {
        let (doc, vm) = mount();
        let data = vm.data().clone();
        drop(vm);

        let input = doc.query_selector("input").unwrap().unwrap();
        assert_eq!(input.listener_count(), 0);
        assert_eq!(data.dependency("c").unwrap().subscriber_count(), 0);
    }
}
