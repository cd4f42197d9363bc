// ============================================================================
// spark-mvvm - Interpolation
// Splitting text into literal runs and `{{ path }}` spans
// ============================================================================

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static MUSTACHE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(.*?)\}\}").unwrap());

/// One `{{ expression }}` occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Byte range of the whole placeholder, braces included
    pub range: Range<usize>,
    /// The trimmed text between the braces
    pub expression: String,
}

/// A text node's raw content and its placeholders, in order.
#[derive(Debug, Clone)]
pub struct TextTemplate {
    source: String,
    spans: Vec<Span>,
}

impl TextTemplate {
    /// Scan `source` for placeholders. `None` if there are none.
    pub fn parse(source: &str) -> Option<Self> {
        let spans: Vec<Span> = MUSTACHE
            .captures_iter(source)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let inner = caps.get(1)?;
                Some(Span {
                    range: whole.range(),
                    expression: inner.as_str().trim().to_string(),
                })
            })
            .collect();

        if spans.is_empty() {
            None
        } else {
            Some(Self {
                source: source.to_string(),
                spans,
            })
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute `values[i]` for span `i`, then trim.
    ///
    /// A `None` value leaves that placeholder's raw text in place.
    pub fn render(&self, values: &[Option<String>]) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for (i, span) in self.spans.iter().enumerate() {
            out.push_str(&self.source[cursor..span.range.start]);
            match values.get(i).and_then(Option::as_deref) {
                Some(value) => out.push_str(value),
                None => out.push_str(&self.source[span.range.clone()]),
            }
            cursor = span.range.end;
        }
        out.push_str(&self.source[cursor..]);
        out.trim().to_string()
    }
}
