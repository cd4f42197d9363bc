// ============================================================================
// spark-mvvm - Ergonomic Macros
// ============================================================================

/// Helper macro to clone variables into a move closure.
///
/// This reduces the boilerplate of manually cloning `Rc`, `Node` or
/// `ReactiveNode` handles before moving them into a watcher callback.
///
/// # Usage
///
/// ```rust
/// use spark_mvvm::{cloned, Node, ReactiveNode, Value, Watcher};
///
/// let data = ReactiveNode::wrap(serde_json::json!({ "c": 2 })).unwrap();
/// let label = Node::text("");
///
/// let _w = Watcher::watch(&data, "c", cloned!(label => move |v: &Value| {
///     label.set_text_content(&v.to_string())
/// }))
/// .unwrap();
///
/// data.set("c", 3);
/// assert_eq!(label.text_content(), "3");
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}
