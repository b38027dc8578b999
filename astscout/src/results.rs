//! Result types produced by matchers.
//!
//! A [`Match`] is owned data: it records a snapshot of the node it was found
//! in ([`NodeRef`]) rather than borrowing the syntax tree, so matches can be
//! sent across the pipeline's channels while the tree they came from is
//! dropped. Positions stay resolvable for as long as the run's
//! [`FileSet`](crate::syntax::FileSet) is alive.

use crate::syntax::{FileSet, NodeKind, Pos, Position, SyntaxNode};

/// Snapshot of the syntax node a match was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRef {
    /// Node identity, unique within the node's tree
    pub id: usize,
    pub kind: NodeKind,
    /// Raw grammar kind of the node
    pub grammar_kind: &'static str,
    pub start: Pos,
    pub end: Pos,
}

impl From<&SyntaxNode<'_>> for NodeRef {
    fn from(node: &SyntaxNode<'_>) -> Self {
        Self {
            id: node.id(),
            kind: node.kind(),
            grammar_kind: node.grammar_kind(),
            start: node.start(),
            end: node.end(),
        }
    }
}

/// A located occurrence of a pattern inside a node's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The node matched against
    pub node: NodeRef,
    /// The contents the pattern was run against
    pub text: String,
    /// Offset of the match within `text`
    pub base: usize,
    /// Length of the matched text
    pub length: usize,
}

/// The three parts of a match's text: before, inside and after the match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight<'a> {
    pub prefix: &'a str,
    pub matched: &'a str,
    pub suffix: &'a str,
}

impl Match {
    pub fn new(node: NodeRef, text: impl Into<String>, base: usize, length: usize) -> Self {
        let text = text.into();
        debug_assert!(base + length <= text.len(), "match exceeds text bounds");
        Self {
            node,
            text,
            base,
            length,
        }
    }

    /// Position of the first character of the match.
    pub fn pos(&self) -> Pos {
        self.node.start.offset(self.base)
    }

    /// Position of the first character immediately after the match.
    pub fn end(&self) -> Pos {
        self.node.start.offset(self.base + self.length)
    }

    /// Resolves the start of the match to a file, line and column.
    ///
    /// # Panics
    ///
    /// Panics if the match was not produced from a file registered in `fset`.
    pub fn position(&self, fset: &FileSet) -> Position {
        fset.position(self.pos())
            .unwrap_or_else(|| panic!("position {:?} is not part of the file set", self.pos()))
    }

    /// The matched text
    pub fn matched(&self) -> &str {
        &self.text[self.base..self.base + self.length]
    }

    /// Splits `text` around the match.
    pub fn highlighted(&self) -> Highlight<'_> {
        let end = self.base + self.length;
        Highlight {
            prefix: &self.text[..self.base],
            matched: &self.text[self.base..end],
            suffix: &self.text[end..],
        }
    }
}
