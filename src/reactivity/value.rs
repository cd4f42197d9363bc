// ============================================================================
// spark-mvvm - Value
// The dynamic data tree stored in reactive slots
// ============================================================================

use std::fmt;
use std::rc::Rc;

use crate::core::error::{BindError, Result};
use crate::reactivity::node::ReactiveNode;
use crate::reactivity::tracking::untrack;

/// A value held by a reactive property.
///
/// Objects are always reactive nodes, so converting a JSON object into a
/// `Value` wraps it (and every nested object) on the spot. Lists are opaque
/// leaves: replacing a list notifies, mutating one in place is impossible.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent property
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Rc<Vec<Value>>),
    Object(ReactiveNode),
}

impl Value {
    /// Short type name, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// The reactive node behind an object value
    pub fn as_object(&self) -> Option<&ReactiveNode> {
        match self {
            Value::Object(node) => Some(node),
            _ => None,
        }
    }

    /// Like `as_object`, but reports leaves as `NotAnObject`
    pub fn try_object(&self) -> Result<&ReactiveNode> {
        self.as_object().ok_or(BindError::NotAnObject { kind: self.kind() })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Strict equality: leaves by value, objects and lists by identity.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Text written into the DOM for this value.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.to_display_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
        }
    }

    /// Snapshot into JSON without registering dependencies.
    ///
    /// `Undefined` becomes `null`; non-finite numbers become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        untrack(|| self.to_json_untracked())
    }

    fn to_json_untracked(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Undefined | Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    Json::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number)
                }
            }
            Value::String(s) => Json::String(s.clone()),
            Value::List(items) => {
                Json::Array(items.iter().map(|v| v.to_json_untracked()).collect())
            }
            Value::Object(node) => Json::Object(
                node.entries()
                    .into_iter()
                    .map(|(k, v)| (k, v.to_json_untracked()))
                    .collect(),
            ),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        // Integral values print without a fractional part; -0 prints as 0
        format!("{}", n as i128)
    } else {
        format!("{}", n)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Object(node) => write!(f, "{:?}", node),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(items) => {
                Value::List(Rc::new(items.into_iter().map(Value::from).collect()))
            }
            Json::Object(map) => Value::Object(ReactiveNode::from_entries(
                map.into_iter().map(|(k, v)| (k, Value::from(v))),
            )),
        }
    }
}

impl From<ReactiveNode> for Value {
    fn from(node: ReactiveNode) -> Self {
        Value::Object(node)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_render_like_dom_text() {
        assert_eq!(Value::from(1123).to_display_string(), "1123");
        assert_eq!(Value::from(42.0).to_display_string(), "42");
        assert_eq!(Value::from(0.5).to_display_string(), "0.5");
        assert_eq!(Value::from(-0.0).to_display_string(), "0");
        assert_eq!(Value::from(f64::NAN).to_display_string(), "NaN");
        assert_eq!(Value::from(f64::NEG_INFINITY).to_display_string(), "-Infinity");
    }

    #[test]
    fn leaves_render() {
        assert_eq!(Value::Undefined.to_display_string(), "undefined");
        assert_eq!(Value::Null.to_display_string(), "null");
        assert_eq!(Value::from(true).to_display_string(), "true");
        assert_eq!(Value::from("9").to_string(), "9");
        assert_eq!(Value::from(json!([1, null, "x"])).to_display_string(), "1,,x");
        assert_eq!(Value::from(json!({"a": 1})).to_display_string(), "[object Object]");
    }

    #[test]
    fn strict_equality() {
        assert_eq!(Value::from(2), Value::from(2.0));
        assert_ne!(Value::from(9), Value::from("9"));
        assert_ne!(Value::Null, Value::Undefined);
        assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));

        let a = Value::from(json!({"b": 1}));
        let same_shape = Value::from(json!({"b": 1}));
        assert_eq!(a, a.clone());
        assert_ne!(a, same_shape);

        let list = Value::from(json!([1, 2]));
        assert_eq!(list, list.clone());
        assert_ne!(list, Value::from(json!([1, 2])));
    }

    #[test]
    fn json_objects_are_wrapped_deeply() {
        let v = Value::from(json!({"a": {"b": {"c": 1}}}));
        let a = v.as_object().unwrap().peek("a");
        let b = a.as_object().unwrap().peek("b");
        assert!(b.is_object());
    }

    #[test]
    fn leaves_are_not_objects() {
        let err = Value::from(3).try_object().unwrap_err();
        assert_eq!(err, BindError::NotAnObject { kind: "number" });
    }

    #[test]
    fn json_snapshot() {
        let source = json!({"a": {"b": 1123}, "c": 2, "d": [true, "x"], "e": 1.5});
        let v = Value::from(source.clone());
        assert_eq!(v.to_json(), source);
        assert_eq!(Value::Undefined.to_json(), serde_json::Value::Null);
    }
}
