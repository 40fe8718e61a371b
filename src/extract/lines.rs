use std::slice;

use super::fields::normalize_whitespace;
use crate::markup::Node;

const SKIPPED: &[&str] = &["head", "script", "style", "title", "noscript", "template"];

const BLOCKS: &[&str] = &[
    "html", "body", "p", "div", "tr", "li", "h1", "h2", "h3", "h4", "h5", "h6", "table", "tbody",
    "thead", "tfoot", "ul", "ol", "section", "article", "header", "footer", "pre", "blockquote",
    "dl", "dt", "dd", "center", "hr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Skipped,
    Break,
    Block,
    Cell,
    Inline,
}

impl ElementKind {
    fn of(name: &str) -> Self {
        match name {
            "br" => ElementKind::Break,
            "td" | "th" => ElementKind::Cell,
            _ if SKIPPED.contains(&name) => ElementKind::Skipped,
            _ if BLOCKS.contains(&name) => ElementKind::Block,
            _ => ElementKind::Inline,
        }
    }
}

/// One visual line of the statement: a single field for plain text, one
/// field per cell for a table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    fields: Vec<String>,
}

impl Line {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }

    /// The text of a line that has exactly one field.
    pub fn single(&self) -> Option<&str> {
        match self.fields.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

struct Frame<'a> {
    children: slice::Iter<'a, Node>,
    kind: ElementKind,
}

/// Depth-first walk of a [`Node`] tree yielding its visual lines in reading
/// order.
///
/// `<br>` and block element boundaries end a line; table cells split a line
/// into fields, empty cells included. Lines without any text are never
/// yielded.
pub struct Lines<'a> {
    stack: Vec<Frame<'a>>,
    fields: Vec<String>,
    cell: String,
}

impl<'a> Lines<'a> {
    pub fn new(root: &'a Node) -> Self {
        Lines {
            stack: vec![Frame {
                children: slice::from_ref(root).iter(),
                kind: ElementKind::Inline,
            }],
            fields: Vec::new(),
            cell: String::new(),
        }
    }

    /// Closes the text collected so far. A closed table cell keeps its column
    /// even when empty; loose text between cells is dropped when blank.
    fn end_cell(&mut self, keep_empty: bool) {
        let text = normalize_whitespace(&self.cell);
        self.cell.clear();
        if keep_empty || !text.is_empty() {
            self.fields.push(text);
        }
    }

    fn flush(&mut self) -> Option<Line> {
        self.end_cell(false);
        let fields = std::mem::take(&mut self.fields);
        if fields.iter().all(String::is_empty) {
            return None;
        }
        Some(Line { fields })
    }
}

impl Iterator for Lines<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Line> {
        loop {
            let Some(frame) = self.stack.last_mut() else {
                return self.flush();
            };

            match frame.children.next() {
                Some(Node::Text(text)) => self.cell.push_str(text),
                Some(Node::Element { name, children }) => {
                    let kind = ElementKind::of(name);
                    if kind == ElementKind::Skipped {
                        continue;
                    }

                    self.stack.push(Frame {
                        children: children.iter(),
                        kind,
                    });

                    match kind {
                        ElementKind::Break | ElementKind::Block => {
                            if let Some(line) = self.flush() {
                                return Some(line);
                            }
                        }
                        ElementKind::Cell => self.end_cell(false),
                        ElementKind::Inline | ElementKind::Skipped => {}
                    }
                }
                None => {
                    let closed = self.stack.pop().map(|frame| frame.kind);
                    match closed {
                        Some(ElementKind::Block) => {
                            if let Some(line) = self.flush() {
                                return Some(line);
                            }
                        }
                        Some(ElementKind::Cell) => self.end_cell(true),
                        _ => {}
                    }
                }
            }
        }
    }
}
