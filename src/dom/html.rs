// ============================================================================
// spark-mvvm - HTML
// A small markup parser and serializer for the in-memory DOM
// ============================================================================
//
// Supported: elements, quoted / unquoted / boolean attributes, void elements,
// self-closing tags, comments (dropped), raw text in <script>/<style>, and
// the entities &amp; &lt; &gt; &quot; &#39;. Unclosed elements are closed at
// end of input; a stray or mismatched closing tag is an error.
// ============================================================================

use crate::core::error::{BindError, Result};

use super::node::{Node, NodeType};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> BindError {
        BindError::Parse {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let end = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn read_name(&mut self) -> &'a str {
        self.read_while(|c| !c.is_whitespace() && !matches!(c, '/' | '>' | '=' | '<' | '"' | '\''))
    }

    /// Parse children into `parent` until `</closing>` (or end of input).
    fn parse_children(&mut self, parent: &Node, closing: Option<&str>) -> Result<()> {
        while self.pos < self.src.len() {
            if self.eat("<!--") {
                match self.rest().find("-->") {
                    Some(end) => self.pos += end + 3,
                    None => return Err(self.error("unterminated comment")),
                }
            } else if self.rest().starts_with("</") {
                let start = self.pos;
                self.pos += 2;
                let name = self.read_name().to_ascii_lowercase();
                self.skip_whitespace();
                if !self.eat(">") {
                    return Err(self.error("expected '>' after closing tag"));
                }
                return match closing {
                    Some(expected) if expected == name => Ok(()),
                    _ => {
                        self.pos = start;
                        Err(self.error(format!("unexpected closing tag </{}>", name)))
                    }
                };
            } else if self.rest().starts_with('<')
                && self.rest()[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                self.parse_element(parent)?;
            } else {
                let rest = self.rest();
                // Always consume at least the first char (maybe a stray '<')
                let skip = rest.chars().next().map_or(0, char::len_utf8);
                let end = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
                let text = &rest[..end];
                self.pos += end;
                parent.append_child(&Node::text(&decode_entities(text)));
            }
        }
        Ok(())
    }

    fn parse_element(&mut self, parent: &Node) -> Result<()> {
        self.pos += 1; // '<'
        let tag = self.read_name().to_ascii_lowercase();
        let element = Node::element(&tag);
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.error(format!("unterminated <{}> tag", tag))),
                Some('>') => {
                    self.pos += 1;
                    break;
                }
                Some('/') if self.rest().starts_with("/>") => {
                    self.pos += 2;
                    self_closing = true;
                    break;
                }
                Some(_) => {
                    let name = self.read_name();
                    if name.is_empty() {
                        return Err(self.error("expected attribute name"));
                    }
                    self.skip_whitespace();
                    let value = if self.eat("=") {
                        self.skip_whitespace();
                        self.parse_attribute_value()?
                    } else {
                        String::new()
                    };
                    element.set_attribute(name, &value);
                }
            }
        }

        if let Some(value) = element.get_attribute("value") {
            element.set_value(&value);
        }
        parent.append_child(&element);

        if self_closing || is_void(&tag) {
            return Ok(());
        }

        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            let closing = format!("</{}", tag);
            let end = self
                .rest()
                .to_ascii_lowercase()
                .find(&closing)
                .ok_or_else(|| self.error(format!("unterminated <{}>", tag)))?;
            let raw = &self.rest()[..end];
            if !raw.is_empty() {
                element.append_child(&Node::text(raw));
            }
            self.pos += end + closing.len();
            self.skip_whitespace();
            if !self.eat(">") {
                return Err(self.error("expected '>' after closing tag"));
            }
            return Ok(());
        }

        self.parse_children(&element, Some(&tag))
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let end = self
                    .rest()
                    .find(quote)
                    .ok_or_else(|| self.error("unterminated attribute value"))?;
                let value = decode_entities(&self.rest()[..end]);
                self.pos += end + 1;
                Ok(value)
            }
            _ => {
                let raw = self.read_while(|c| !c.is_whitespace() && c != '>');
                let raw = match raw.strip_suffix('/') {
                    // `a=b/>`: hand the '/' back to the tag parser
                    Some(value) if self.peek() == Some('>') => {
                        self.pos -= 1;
                        value
                    }
                    _ => raw,
                };
                Ok(decode_entities(raw))
            }
        }
    }
}

/// Parse markup into `parent`.
pub fn parse_into(parent: &Node, src: &str) -> Result<()> {
    let mut parser = Parser { src, pos: 0 };
    parser.parse_children(parent, None)
}

/// Append the HTML for `node` to `out`.
pub fn serialize(node: &Node, out: &mut String) {
    match node.node_type() {
        NodeType::Text => {
            let raw_parent = node
                .parent()
                .is_some_and(|p| RAW_TEXT_ELEMENTS.contains(&p.tag_name()));
            if raw_parent {
                out.push_str(&node.text_content());
            } else {
                out.push_str(&escape_text(&node.text_content()));
            }
        }
        NodeType::Element => {
            let tag = node.tag_name();
            out.push('<');
            out.push_str(tag);
            for attr in node.attributes() {
                out.push(' ');
                out.push_str(&attr.name);
                if !attr.value.is_empty() {
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(&attr.value));
                    out.push('"');
                }
            }
            out.push('>');
            if is_void(tag) {
                return;
            }
            for child in node.child_nodes() {
                serialize(&child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeType::Document | NodeType::Fragment => {
            for child in node.child_nodes() {
                serialize(&child, out);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Node {
        let root = Node::fragment();
        parse_into(&root, src).unwrap();
        root
    }

    #[test]
    fn parses_nested_elements_and_text() {
        let root = parse("<div id=\"app\"><p>{{a.b}}</p> tail</div>");
        let div = root.first_child().unwrap();
        assert_eq!(div.tag_name(), "div");
        assert_eq!(div.get_attribute("id").as_deref(), Some("app"));
        assert_eq!(div.child_nodes().len(), 2);
        assert_eq!(div.text_content(), "{{a.b}} tail");
    }

    #[test]
    fn attribute_forms() {
        let root = parse("<input v-model=c disabled type='text' data-x=\"a &amp; b\">");
        let input = root.first_child().unwrap();
        assert_eq!(input.get_attribute("v-model").as_deref(), Some("c"));
        assert_eq!(input.get_attribute("disabled").as_deref(), Some(""));
        assert_eq!(input.get_attribute("type").as_deref(), Some("text"));
        assert_eq!(input.get_attribute("data-x").as_deref(), Some("a & b"));
    }

    #[test]
    fn void_and_self_closing_elements_take_no_children() {
        let root = parse("<div><input v-model=c/><br>text<span/>after</div>");
        let div = root.first_child().unwrap();
        let kids = div.child_nodes();
        assert_eq!(kids.len(), 5);
        assert_eq!(kids[0].get_attribute("v-model").as_deref(), Some("c"));
        assert!(!kids[0].has_child_nodes());
        assert_eq!(kids[3].tag_name(), "span");
        assert!(!kids[3].has_child_nodes());
    }

    #[test]
    fn value_attribute_seeds_value_property() {
        let root = parse("<input value=\"hello\">");
        assert_eq!(root.first_child().unwrap().value(), "hello");
    }

    #[test]
    fn comments_are_dropped_and_entities_decoded() {
        let root = parse("<p><!-- note -->1 &lt; 2</p>");
        let p = root.first_child().unwrap();
        assert_eq!(p.child_nodes().len(), 1);
        assert_eq!(p.text_content(), "1 < 2");
    }

    #[test]
    fn raw_text_elements() {
        let root = parse("<style>p > a { x: 1 }</style><p>ok</p>");
        let kids = root.child_nodes();
        assert_eq!(kids[0].text_content(), "p > a { x: 1 }");
        assert_eq!(kids[1].text_content(), "ok");
    }

    #[test]
    fn stray_less_than_is_text() {
        let root = parse("<p>a < b</p>");
        assert_eq!(root.first_child().unwrap().text_content(), "a < b");
    }

    #[test]
    fn mismatched_closing_tag_is_an_error() {
        let root = Node::fragment();
        let err = parse_into(&root, "<div><p></div>").unwrap_err();
        assert!(matches!(err, BindError::Parse { offset: 8, .. }));

        let err = parse_into(&Node::fragment(), "<!-- open").unwrap_err();
        assert!(matches!(err, BindError::Parse { .. }));
    }

    #[test]
    fn unclosed_elements_close_at_end_of_input() {
        let root = parse("<div><p>text");
        assert_eq!(root.to_html(), "<div><p>text</p></div>");
    }

    #[test]
    fn serialization_round_trips_markup() {
        let src = "<div id=\"app\"><input v-model=\"c\"><p class=\"x\">1 &amp; 2</p></div>";
        assert_eq!(parse(src).to_html(), src);
    }
}
