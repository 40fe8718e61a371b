use super::node::Node;
use crate::errors::StatementResult;

/// Turns raw statement bytes into a navigable [`Node`] tree.
///
/// The extractor only ever sees the tree, so any backend able to produce one
/// can stand in for the default HTML parser.
pub trait MarkupParser {
    fn parse(&self, content: &[u8]) -> StatementResult<Node>;

    fn is_supported(&self, filename: Option<&str>, content: &[u8]) -> bool;
}
