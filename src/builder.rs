use std::fs;

use crate::errors::{StatementParseError, StatementResult};
use crate::extract::Records;
use crate::markup::prelude::*;

/// A statement whose markup parsed successfully. Records are extracted
/// lazily; every call to [`Statement::records`] starts a fresh pass.
#[derive(Debug, Clone)]
pub struct Statement {
    root: Node,
}

impl Statement {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn records(&self) -> Records<'_> {
        Records::new(&self.root)
    }
}

#[derive(Default)]
pub struct ExtractorBuilder {
    content: Option<Vec<u8>>,
    filepath: Option<String>,
}

impl ExtractorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: &str) -> Self {
        self.content = Some(content.as_bytes().to_vec());
        self
    }

    pub fn bytes(mut self, content: &[u8]) -> Self {
        self.content = Some(content.to_vec());
        self
    }

    pub fn filename(mut self, filename: &str) -> Self {
        self.filepath = Some(filename.to_string());
        self
    }

    pub fn parse(self) -> StatementResult<Statement> {
        self.parse_with(&HtmlParser)
    }

    /// Parses with a caller-supplied markup backend.
    pub fn parse_with<P: MarkupParser>(self, parser: &P) -> StatementResult<Statement> {
        let content = self
            .content
            .map(Ok)
            .unwrap_or_else(|| {
                self.filepath
                    .as_deref()
                    .ok_or(StatementParseError::MissingContentAndFilepath)
                    .and_then(|path| fs::read(path).map_err(Into::into))
            })?;

        if let Some(filename) = self.filepath.as_deref() {
            if !parser.is_supported(Some(filename), &content) {
                return Err(StatementParseError::UnsupportedFormat);
            }
        }

        let root = parser.parse(&content)?;
        Ok(Statement::new(root))
    }
}
