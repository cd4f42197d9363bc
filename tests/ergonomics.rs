use serde_json::json;
use spark_mvvm::{cloned, untrack, Node, ReactiveNode, Value, Watcher};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn ergonomic_cloned_macro() {
    let data = ReactiveNode::wrap(json!({"first": "Ada", "last": "Lovelace"})).unwrap();
    let label = Node::text("");

    // Old way (painful)
    let _first = Watcher::watch(&data, "first", {
        let label = label.clone();
        move |v: &Value| label.set_text_content(&v.to_string())
    })
    .unwrap();

    // New way (ergonomic)
    let _last = Watcher::watch(
        &data,
        "last",
        cloned!(label => move |v: &Value| label.set_text_content(&v.to_string())),
    )
    .unwrap();

    data.set("first", "Grace");
    assert_eq!(label.text_content(), "Grace");

    data.set("last", "Hopper");
    assert_eq!(label.text_content(), "Hopper");
}

#[test]
fn ergonomic_cloned_macro_multiple_handles() {
    let data = ReactiveNode::wrap(json!({"a": 1, "b": 2})).unwrap();
    let sums = Rc::new(RefCell::new(Vec::new()));

    // Capture the data root and the log in one callback
    let _w = Watcher::watch(
        &data,
        "a",
        cloned!(data, sums => move |a: &Value| {
            let b = untrack(|| data.get("b"));
            let sum = a.as_f64().unwrap_or(0.0) + b.as_f64().unwrap_or(0.0);
            sums.borrow_mut().push(sum);
        }),
    )
    .unwrap();

    data.set("a", 10);
    // b was read untracked, so writing it does not re-run the watcher
    data.set("b", 20);
    data.set("a", 11);

    assert_eq!(*sums.borrow(), vec![12.0, 31.0]);
}

#[test]
fn values_from_plain_rust() {
    let data = ReactiveNode::from_entries([
        ("name", Value::from("spark")),
        ("count", Value::from(3)),
        ("nested", Value::from(json!({"ok": true}))),
    ]);
    assert_eq!(data.keys(), vec!["name", "count", "nested"]);
    assert_eq!(data.get_path("nested.ok").unwrap(), Value::from(true));
    assert_eq!(
        Value::from(data).to_json(),
        json!({"name": "spark", "count": 3, "nested": {"ok": true}})
    );
}
