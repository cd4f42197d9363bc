// ============================================================================
// spark-mvvm - Path
// Dot-path expressions into the data tree
// ============================================================================

use std::fmt;

use crate::core::constants::PATH_SEPARATOR;
use crate::core::error::{BindError, Result};
use crate::reactivity::node::ReactiveNode;
use crate::reactivity::tracking::untrack;
use crate::reactivity::value::Value;

/// A parsed `identifier(.identifier)*` expression.
///
/// Examples:
/// - "c" → ["c"]
/// - " a.b " → ["a", "b"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    expr: String,
    segments: Vec<String>,
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

impl Path {
    /// Parse an expression, trimming surrounding whitespace.
    pub fn parse(expr: &str) -> Result<Self> {
        let expr = expr.trim();
        let segments: Vec<String> = expr
            .split(PATH_SEPARATOR)
            .map(|segment| segment.trim().to_string())
            .collect();

        if expr.is_empty() || !segments.iter().all(|s| is_identifier(s)) {
            return Err(BindError::InvalidPath {
                path: expr.to_string(),
            });
        }

        Ok(Self {
            expr: segments.join("."),
            segments,
        })
    }

    /// The normalized expression text
    pub fn as_str(&self) -> &str {
        &self.expr
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walk the path from `root`, one tracked read per segment.
    ///
    /// An absent final segment resolves to `Undefined`; an intermediate
    /// segment that is not an object is a `PathResolution` error naming it.
    pub fn resolve(&self, root: &ReactiveNode) -> Result<Value> {
        let mut node = root.clone();
        let (last, parents) = self.split_last();

        for segment in parents {
            match node.get(segment) {
                Value::Object(next) => node = next,
                _ => return Err(self.unresolved(segment)),
            }
        }

        Ok(node.get(last))
    }

    /// Write `value` at this path. Parents are resolved untracked.
    pub fn assign(&self, root: &ReactiveNode, value: Value) -> Result<bool> {
        let (last, parents) = self.split_last();

        let target = untrack(|| {
            let mut node = root.clone();
            for segment in parents {
                match node.get(segment) {
                    Value::Object(next) => node = next,
                    _ => return Err(self.unresolved(segment)),
                }
            }
            Ok(node)
        })?;

        Ok(target.set(last, value))
    }

    fn split_last(&self) -> (&str, &[String]) {
        // parse() guarantees at least one segment
        let (last, parents) = self
            .segments
            .split_last()
            .map(|(last, parents)| (last.as_str(), parents))
            .unwrap_or(("", &[]));
        (last, parents)
    }

    fn unresolved(&self, segment: &str) -> BindError {
        BindError::PathResolution {
            path: self.expr.clone(),
            segment: segment.to_string(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
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
    fn parses_dotted_identifiers() {
        let path = Path::parse("  a.b  ").unwrap();
        assert_eq!(path.segments(), ["a", "b"]);
        assert_eq!(path.as_str(), "a.b");

        let path = Path::parse("a . b").unwrap();
        assert_eq!(path.to_string(), "a.b");

        assert!(Path::parse("$root._x1").is_ok());
    }

    #[test]
    fn rejects_malformed_expressions() {
        for bad in ["", "   ", "a..b", ".a", "a.", "1a", "a-b", "a[0]", "a b"] {
            assert!(
                matches!(Path::parse(bad), Err(BindError::InvalidPath { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn resolves_against_nested_nodes() {
        let data = ReactiveNode::wrap(json!({"a": {"b": 1123}, "c": 2})).unwrap();
        assert_eq!(Path::parse("a.b").unwrap().resolve(&data).unwrap(), Value::from(1123));
        assert_eq!(Path::parse("c").unwrap().resolve(&data).unwrap(), Value::from(2));
        assert!(Path::parse("a.zz").unwrap().resolve(&data).unwrap().is_undefined());
    }

    #[test]
    fn intermediate_leaf_fails() {
        let data = ReactiveNode::wrap(json!({"c": 2})).unwrap();

        let err = Path::parse("x.y").unwrap().resolve(&data).unwrap_err();
        assert_eq!(
            err,
            BindError::PathResolution {
                path: "x.y".into(),
                segment: "x".into()
            }
        );

        let err = Path::parse("c.d.e").unwrap().resolve(&data).unwrap_err();
        assert!(matches!(err, BindError::PathResolution { segment, .. } if segment == "c"));
    }
}
