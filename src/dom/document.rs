// ============================================================================
// spark-mvvm - Document
// ============================================================================

use crate::core::error::Result;

use super::html;
use super::node::Node;
use super::selector::Selector;

/// The host document: a root node plus selector lookup.
#[derive(Debug, Clone)]
pub struct Document {
    root: Node,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self {
            root: Node::document_root(),
        }
    }

    /// Build a document from markup.
    ///
    /// # Example
    ///
    /// ```
    /// use spark_mvvm::Document;
    ///
    /// let doc = Document::parse("<div id=\"app\"><p>{{ a.b }}</p></div>").unwrap();
    /// let app = doc.query_selector("#app").unwrap().unwrap();
    /// assert_eq!(app.text_content(), "{{ a.b }}");
    /// ```
    pub fn parse(markup: &str) -> Result<Self> {
        let doc = Self::new();
        html::parse_into(&doc.root, markup)?;
        Ok(doc)
    }

    /// The document node; top-level elements are its children
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// First element in document order matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .root
            .descendants()
            .into_iter()
            .find(|node| selector.matches(node)))
    }

    /// Every element matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .root
            .descendants()
            .into_iter()
            .filter(|node| selector.matches(node))
            .collect())
    }

    /// Serialize the whole document
    pub fn to_html(&self) -> String {
        self.root.to_html()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::BindError;

    const PAGE: &str =
        "<main><div id=\"app\" class=\"root\"><input v-model=\"c\"><input></div></main>";

    #[test]
    fn finds_first_match_in_document_order() {
        let doc = Document::parse(PAGE).unwrap();
        let app = doc.query_selector("#app").unwrap().unwrap();
        assert_eq!(app.tag_name(), "div");
        assert!(doc.query_selector("div.root").unwrap().unwrap().ptr_eq(&app));

        let first_input = doc.query_selector("input").unwrap().unwrap();
        assert!(first_input.has_attribute("v-model"));
        assert_eq!(doc.query_selector_all("input").unwrap().len(), 2);
    }

    #[test]
    fn missing_element_is_none() {
        let doc = Document::parse(PAGE).unwrap();
        assert!(doc.query_selector("#nope").unwrap().is_none());
    }

    #[test]
    fn bad_selector_is_an_error() {
        let doc = Document::new();
        assert!(matches!(
            doc.query_selector("main > div"),
            Err(BindError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn serializes_back() {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(doc.to_html(), PAGE);
    }
}
