// ============================================================================
// spark-mvvm - Selectors
// Simple compound selectors: tag, #id, .class, [attr], [attr=value]
// ============================================================================

use crate::core::error::{BindError, Result};

use super::node::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Id(String),
    Class(String),
    HasAttribute(String),
    AttributeEquals(String, String),
}

/// A parsed compound selector such as `input#name.wide[v-model]`.
///
/// Combinators, pseudo-classes and selector lists are not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    conditions: Vec<Condition>,
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |reason: &str| BindError::InvalidSelector {
            selector: source.to_string(),
            reason: reason.to_string(),
        };

        let text = source.trim();
        if text.is_empty() {
            return Err(invalid("empty selector"));
        }

        let chars: Vec<char> = text.chars().collect();
        let mut pos = 0;

        let read_name = |pos: &mut usize| -> String {
            let start = *pos;
            while *pos < chars.len() && is_name_char(chars[*pos]) {
                *pos += 1;
            }
            chars[start..*pos].iter().collect()
        };

        let mut tag = None;
        if chars[0] == '*' {
            pos = 1;
        } else if is_name_char(chars[0]) {
            tag = Some(read_name(&mut pos).to_ascii_lowercase());
        }

        let mut conditions = Vec::new();
        while pos < chars.len() {
            match chars[pos] {
                '#' | '.' => {
                    let marker = chars[pos];
                    pos += 1;
                    let name = read_name(&mut pos);
                    if name.is_empty() {
                        return Err(invalid("expected a name"));
                    }
                    conditions.push(if marker == '#' {
                        Condition::Id(name)
                    } else {
                        Condition::Class(name)
                    });
                }
                '[' => {
                    pos += 1;
                    let name = read_name(&mut pos).to_ascii_lowercase();
                    if name.is_empty() {
                        return Err(invalid("expected an attribute name"));
                    }
                    match chars.get(pos) {
                        Some(']') => {
                            pos += 1;
                            conditions.push(Condition::HasAttribute(name));
                        }
                        Some('=') => {
                            pos += 1;
                            let value = match chars.get(pos) {
                                Some(&quote @ ('"' | '\'')) => {
                                    pos += 1;
                                    let start = pos;
                                    while pos < chars.len() && chars[pos] != quote {
                                        pos += 1;
                                    }
                                    if pos == chars.len() {
                                        return Err(invalid("unterminated string"));
                                    }
                                    let value: String = chars[start..pos].iter().collect();
                                    pos += 1;
                                    value
                                }
                                _ => read_name(&mut pos),
                            };
                            if chars.get(pos) != Some(&']') {
                                return Err(invalid("expected ']'"));
                            }
                            pos += 1;
                            conditions.push(Condition::AttributeEquals(name, value));
                        }
                        _ => return Err(invalid("expected ']' or '='")),
                    }
                }
                c if c.is_whitespace() || matches!(c, '>' | '+' | '~' | ',') => {
                    return Err(invalid("combinators are not supported"));
                }
                ':' => return Err(invalid("pseudo-classes are not supported")),
                _ => return Err(invalid("unexpected character")),
            }
        }

        Ok(Self { tag, conditions })
    }

    /// Whether `node` is an element satisfying every part of the selector
    pub fn matches(&self, node: &Node) -> bool {
        if !node.is_element() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if node.tag_name() != tag {
                return false;
            }
        }
        self.conditions.iter().all(|condition| match condition {
            Condition::Id(id) => node.get_attribute("id").as_deref() == Some(id.as_str()),
            Condition::Class(class) => node
                .get_attribute("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
            Condition::HasAttribute(name) => node.has_attribute(name),
            Condition::AttributeEquals(name, value) => {
                node.get_attribute(name).as_deref() == Some(value.as_str())
            }
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
