use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use tree_sitter::{Language, Node, Parser};

use super::fileset::FileSet;
use super::tree::ParsedFile;
use crate::errors::{SearchError, SearchResult};

static GO: Lazy<Language> = Lazy::new(|| tree_sitter_go::LANGUAGE.into());

/// Parses Go source files into [`ParsedFile`]s.
///
/// A parser is not shared between threads; the parse stage owns one and
/// feeds it files one at a time.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> SearchResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&GO)
            .map_err(|e| SearchError::Language(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Reads and parses the file at `path`, registering it in `fset`.
    pub fn parse_file(&mut self, fset: &FileSet, path: &Path) -> SearchResult<ParsedFile> {
        trace!("Reading file: {}", path.display());
        let bytes = std::fs::read(path).map_err(|e| SearchError::from_io(path, e))?;
        let source = String::from_utf8(bytes).map_err(|e| SearchError::encoding_error(path, e))?;
        self.parse_source(fset, path, source)
    }

    /// Parses in-memory source text as if it had been read from `path`.
    ///
    /// Fails on any syntax error; a partially parsed file is never returned.
    /// The file is registered in `fset` only when parsing succeeds.
    pub fn parse_source(
        &mut self,
        fset: &FileSet,
        path: impl Into<PathBuf>,
        source: String,
    ) -> SearchResult<ParsedFile> {
        let path = path.into();
        let tree = self
            .parser
            .parse(&source, None)
            .ok_or_else(|| SearchError::Language("parser returned no tree".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            let point = first_error(root).unwrap_or(root).start_position();
            return Err(SearchError::parse(path, point.row + 1, point.column + 1));
        }
        if let Some(node) = missing_package_clause(root) {
            let point = node.start_position();
            return Err(SearchError::parse(path, point.row + 1, point.column + 1));
        }

        let file = fset.add_file(path.clone(), &source);
        debug!(
            "Parsed {} ({} bytes, {} lines)",
            path.display(),
            file.size(),
            file.line_count()
        );
        Ok(ParsedFile::new(path, source, tree, file))
    }
}

/// The node standing where the `package` clause should be, if it is absent.
///
/// Comments may precede the clause. An empty file reports its root.
fn missing_package_clause(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    let first = root
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    match first {
        Some(node) if node.kind() == "package_clause" => None,
        Some(node) => Some(node),
        None => Some(root),
    }
}

/// Leftmost, outermost error or missing node below `node`.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .filter(|child| child.has_error())
        .find_map(first_error);
    found
}
