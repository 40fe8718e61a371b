/// An owned markup tree, independent of the parser that produced it.
///
/// Element names are stored lowercased. Attributes are not kept: the
/// extractor reads a statement by its visual line structure only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element { name: String, children: Vec<Node> },
    Text(String),
}

impl Node {
    pub fn element(name: &str, children: Vec<Node>) -> Self {
        Node::Element {
            name: name.to_ascii_lowercase(),
            children,
        }
    }

    pub fn text(value: &str) -> Self {
        Node::Text(value.to_string())
    }

    /// Element name, `None` for text nodes.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(name),
            Node::Text(_) => None,
        }
    }

    /// Children in document order. Text nodes have none.
    pub fn children(&self) -> std::slice::Iter<'_, Node> {
        match self {
            Node::Element { children, .. } => children.iter(),
            Node::Text(_) => [].iter(),
        }
    }

    /// Concatenated text of this subtree, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element { children, .. } => stack.extend(children.iter().rev()),
            }
        }
        out
    }
}
