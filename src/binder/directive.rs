// ============================================================================
// spark-mvvm - Directives
// Attribute-name dispatch for `v-*` attributes
// ============================================================================

use crate::core::constants::DIRECTIVE_PREFIX;

/// What a directive attribute does to its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Two-way value binding: data → `value`, `input` events → data
    Model,
}

/// Named directives. Names not listed fall back to `Model`, so every
/// `v-*` attribute binds the element's value.
const DIRECTIVES: &[(&str, DirectiveKind)] = &[
    ("model", DirectiveKind::Model),
    ("value", DirectiveKind::Model),
];

const FALLBACK: DirectiveKind = DirectiveKind::Model;

impl DirectiveKind {
    /// Resolve an attribute name. Only an exact `v-` prefix followed by a
    /// non-empty name is a directive (`data-v-x` is not).
    pub fn lookup(attribute: &str) -> Option<DirectiveKind> {
        let name = attribute.strip_prefix(DIRECTIVE_PREFIX)?;
        if name.is_empty() {
            return None;
        }
        let kind = DIRECTIVES
            .iter()
            .find(|(known, _)| *known == name)
            .map_or(FALLBACK, |(_, kind)| *kind);
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_prefix_only() {
        assert_eq!(DirectiveKind::lookup("v-model"), Some(DirectiveKind::Model));
        assert_eq!(DirectiveKind::lookup("v-value"), Some(DirectiveKind::Model));
        assert_eq!(DirectiveKind::lookup("data-v-model"), None);
        assert_eq!(DirectiveKind::lookup("nav-item"), None);
        assert_eq!(DirectiveKind::lookup("v-"), None);
        assert_eq!(DirectiveKind::lookup("class"), None);
    }

    #[test]
    fn unknown_names_bind_the_value() {
        assert_eq!(DirectiveKind::lookup("v-text"), Some(DirectiveKind::Model));
    }
}
