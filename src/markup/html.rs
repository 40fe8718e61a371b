use scraper::{ElementRef, Html};

use super::node::Node;
use super::traits::MarkupParser;
use crate::errors::{StatementParseError, StatementResult};

/// HTML backend built on `scraper` (html5ever).
///
/// html5ever recovers from almost anything, so the only inputs rejected here
/// are the ones that are not markup to begin with: invalid UTF-8, or text
/// that does not open with a tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupParser for HtmlParser {
    fn parse(&self, content: &[u8]) -> StatementResult<Node> {
        let text = std::str::from_utf8(content).map_err(|_| StatementParseError::InvalidEncoding)?;
        let trimmed = text.trim_start_matches('\u{feff}').trim_start();

        if trimmed.is_empty() {
            return Ok(Node::element("html", Vec::new()));
        }
        if !trimmed.starts_with('<') {
            return Err(StatementParseError::NotMarkup);
        }

        let document = Html::parse_document(trimmed);
        if !document.errors.is_empty() {
            tracing::debug!(count = document.errors.len(), "html5ever recovered from markup errors");
        }

        Ok(convert(document.root_element()))
    }

    fn is_supported(&self, filename: Option<&str>, content: &[u8]) -> bool {
        if let Some(name) = filename {
            let name = name.to_lowercase();
            if name.ends_with(".html") || name.ends_with(".htm") || name.ends_with(".xhtml") {
                return true;
            }
        }

        let head: String = String::from_utf8_lossy(&content[..content.len().min(1024)])
            .trim_start_matches('\u{feff}')
            .trim_start()
            .to_lowercase();
        head.starts_with('<') && (head.contains("<html") || head.contains("<!doctype html"))
    }
}

fn convert(element: ElementRef<'_>) -> Node {
    let children = element
        .children()
        .filter_map(|child| match child.value() {
            scraper::Node::Text(text) => Some(Node::text(text)),
            scraper::Node::Element(_) => ElementRef::wrap(child).map(convert),
            _ => None,
        })
        .collect();

    Node::element(element.value().name(), children)
}
